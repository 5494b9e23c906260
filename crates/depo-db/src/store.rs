use depo_core::error::DepoError;
use depo_core::store::Store;
use rusqlite::Connection;

use crate::case_repo::CaseRepo;
use crate::composition_repo::CompositionRepo;
use crate::deposition_repo::DepositionRepo;
use crate::event_repo::EventRepo;
use crate::participant_repo::ParticipantRepo;
use crate::timeline_repo::TimelineRepo;
use crate::transcription_repo::TranscriptionRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Cases<'a>
        = CaseRepo<'a>
    where
        Self: 'a;
    type Depositions<'a>
        = DepositionRepo<'a>
    where
        Self: 'a;
    type Participants<'a>
        = ParticipantRepo<'a>
    where
        Self: 'a;
    type Timeline<'a>
        = TimelineRepo<'a>
    where
        Self: 'a;
    type Compositions<'a>
        = CompositionRepo<'a>
    where
        Self: 'a;
    type Transcriptions<'a>
        = TranscriptionRepo<'a>
    where
        Self: 'a;
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;

    fn cases(&self) -> Self::Cases<'_> {
        CaseRepo::new(&self.conn)
    }

    fn depositions(&self) -> Self::Depositions<'_> {
        DepositionRepo::new(&self.conn)
    }

    fn participants(&self) -> Self::Participants<'_> {
        ParticipantRepo::new(&self.conn)
    }

    fn timeline(&self) -> Self::Timeline<'_> {
        TimelineRepo::new(&self.conn)
    }

    fn compositions(&self) -> Self::Compositions<'_> {
        CompositionRepo::new(&self.conn)
    }

    fn transcriptions(&self) -> Self::Transcriptions<'_> {
        TranscriptionRepo::new(&self.conn)
    }

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, DepoError>
    where
        F: FnOnce(&Self) -> Result<T, DepoError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(DepoError::internal)?;
        match f(self) {
            Ok(value) => match self.conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(err) => {
                    self.rollback();
                    Err(DepoError::internal(err))
                }
            },
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }
}

impl DbStore {
    /// Leaves the connection usable after a failed transaction. The caller's
    /// error wins over any failure here.
    fn rollback(&self) {
        if self.conn.is_autocommit() {
            return;
        }
        if let Err(err) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!(%err, "rollback failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use depo_core::error::{CompositionError, DepositionError, TranscriptionError};
    use depo_core::types::io::{
        AddParticipantInput, AddTranscriptionInput, CreateCaseInput, DepositionFilter,
        RescheduleInput, ScheduleDepositionInput, UpdateCompositionInput,
    };
    use depo_core::types::{
        CaseId, CompositionStatus, Deposition, DepositionEventKind, DepositionStatus,
        ParticipantRole, RecordingInterval,
    };
    use depo_core::{Depo, RequestContext};
    use depo_events::bus::EventBus;
    use depo_events::types::EventSource;

    #[test]
    fn failed_work_keeps_its_own_error() {
        let store = DbStore::new(with_test_db().unwrap());
        let result: Result<(), DepoError> = store.with_tx(|store| {
            store.connection().execute_batch("COMMIT").map_err(DepoError::internal)?;
            Err(DepositionError::InvalidInput {
                message: "witness_email is required".to_string(),
            }
            .into())
        });
        assert!(matches!(
            result,
            Err(DepoError::Deposition(DepositionError::InvalidInput { .. }))
        ));
        assert!(store.with_tx(|_| Ok(())).is_ok());
    }

    #[test]
    fn failed_commit_rolls_back() {
        let store = DbStore::new(with_test_db().unwrap());
        let result = store.with_tx(|store| {
            store
                .connection()
                .execute_batch(
                    "CREATE TEMP TABLE holder (id INTEGER PRIMARY KEY);
                     CREATE TEMP TABLE held (
                         holder_id INTEGER REFERENCES holder(id) DEFERRABLE INITIALLY DEFERRED
                     );
                     INSERT INTO held (holder_id) VALUES (42);",
                )
                .map_err(DepoError::internal)
        });
        assert!(matches!(result, Err(DepoError::Internal { .. })));
        assert!(store.connection().is_autocommit());

        let held: i64 = store
            .connection()
            .query_row(
                "SELECT count(*) FROM temp.sqlite_master WHERE name = 'held'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(held, 0);
        assert!(store.with_tx(|_| Ok(())).is_ok());
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 5, 6, 15, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    fn ctx(time: DateTime<Utc>) -> RequestContext {
        RequestContext::new(EventSource::Api, Some("corr_test".to_string())).with_time(time)
    }

    fn setup() -> Depo<DbStore> {
        let conn = with_test_db().unwrap();
        Depo::new(DbStore::new(conn), EventBus::new(64))
    }

    fn seed_case(depo: &Depo<DbStore>) -> CaseId {
        depo.cases()
            .create(
                &ctx(at(-86_400)),
                CreateCaseInput {
                    name: "Castillo v. Northgate Freight".to_string(),
                    case_number: "4:30-cv-00921".to_string(),
                },
            )
            .unwrap()
            .id
    }

    fn schedule(depo: &Depo<DbStore>, case_id: &CaseId, email: &str) -> Deposition {
        depo.depositions()
            .schedule(
                &ctx(at(-86_400)),
                ScheduleDepositionInput {
                    case_id: case_id.clone(),
                    witness_name: "Marcus Ode".to_string(),
                    witness_email: email.to_string(),
                    start_at: t0(),
                    end_at: Some(at(3 * 3600)),
                    video_recording: true,
                },
            )
            .unwrap()
    }

    fn event_count(depo: &Depo<DbStore>) -> usize {
        depo.events().list(None, None).unwrap().len()
    }

    #[test]
    fn recording_session_produces_composition_and_timed_transcript() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let deposition = schedule(&depo, &case_id, "marcus@example.com");
        let id = deposition.id.clone();

        depo.depositions().confirm(&ctx(at(-60)), &id).unwrap();
        let started = depo.timeline().start(&ctx(at(0)), &id).unwrap();
        assert_eq!(started.status, DepositionStatus::InProgress);

        depo.timeline().go_on_record(&ctx(at(1)), &id).unwrap();
        depo.timeline().go_off_record(&ctx(at(25)), &id).unwrap();
        depo.timeline().go_on_record(&ctx(at(56)), &id).unwrap();
        depo.transcriptions()
            .add(
                &ctx(at(60)),
                AddTranscriptionInput {
                    deposition_id: id.clone(),
                    speaker_email: Some("Counsel@Example.com".to_string()),
                    text: "Please state your name for the record.".to_string(),
                    at: at(60),
                    duration_ms: 2_400,
                },
            )
            .unwrap();
        let ended = depo.timeline().end(&ctx(at(125)), &id).unwrap();
        assert_eq!(ended.status, DepositionStatus::Completed);

        let kinds: Vec<_> = depo
            .timeline()
            .list(&id)
            .unwrap()
            .into_iter()
            .map(|event| event.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                DepositionEventKind::StartDeposition,
                DepositionEventKind::OnTheRecord,
                DepositionEventKind::OffTheRecord,
                DepositionEventKind::OnTheRecord,
                DepositionEventKind::OffTheRecord,
                DepositionEventKind::EndDeposition,
            ]
        );

        let composition = depo
            .compositions()
            .create_from_recording(&ctx(at(130)), &id, at(130))
            .unwrap();
        assert_eq!(composition.status, CompositionStatus::Queued);
        assert_eq!(composition.recording_anchor, Some(t0()));
        assert_eq!(
            composition.intervals,
            vec![
                RecordingInterval { start: 1, stop: 25 },
                RecordingInterval { start: 56, stop: 125 },
            ]
        );

        let timed = depo.transcriptions().timed(&id).unwrap();
        assert_eq!(timed.len(), 1);
        assert_eq!(timed[0].offset_secs, 28);
        assert_eq!(
            timed[0].transcription.speaker_email.as_deref(),
            Some("counsel@example.com")
        );
    }

    #[test]
    fn open_record_span_closes_at_reference_now() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let id = schedule(&depo, &case_id, "marcus@example.com").id;
        depo.timeline().start(&ctx(at(0)), &id).unwrap();
        depo.timeline().go_on_record(&ctx(at(0)), &id).unwrap();

        let intervals = depo.timeline().recording_intervals(&id, at(90)).unwrap();
        assert_eq!(intervals, vec![RecordingInterval { start: 0, stop: 90 }]);
    }

    #[test]
    fn record_toggles_are_validated() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let id = schedule(&depo, &case_id, "marcus@example.com").id;

        let err = depo.timeline().go_on_record(&ctx(at(0)), &id).unwrap_err();
        assert!(matches!(
            err,
            DepoError::Deposition(DepositionError::InvalidState { .. })
        ));

        depo.timeline().start(&ctx(at(0)), &id).unwrap();
        let err = depo.timeline().go_off_record(&ctx(at(1)), &id).unwrap_err();
        assert!(matches!(err, DepoError::Deposition(DepositionError::NotOnRecord)));

        depo.timeline().go_on_record(&ctx(at(2)), &id).unwrap();
        let err = depo.timeline().go_on_record(&ctx(at(3)), &id).unwrap_err();
        assert!(matches!(err, DepoError::Deposition(DepositionError::AlreadyOnRecord)));
    }

    #[test]
    fn overlapping_schedule_is_rejected_without_side_effects() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let first = schedule(&depo, &case_id, "marcus@example.com");
        let before = event_count(&depo);

        let err = depo
            .depositions()
            .schedule(
                &ctx(at(-86_400)),
                ScheduleDepositionInput {
                    case_id: case_id.clone(),
                    witness_name: "Marcus Ode".to_string(),
                    witness_email: "MARCUS@example.com".to_string(),
                    start_at: at(3600),
                    end_at: None,
                    video_recording: false,
                },
            )
            .unwrap_err();
        match err {
            DepoError::Deposition(DepositionError::ScheduleConflict { conflicting }) => {
                assert_eq!(conflicting, first.id);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(event_count(&depo), before);
        assert_eq!(
            depo.depositions()
                .list(DepositionFilter::default())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn canceled_deposition_frees_the_slot_and_cannot_be_rescheduled() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let first = schedule(&depo, &case_id, "marcus@example.com");
        depo.depositions().cancel(&ctx(at(-100)), &first.id).unwrap();

        let second = schedule(&depo, &case_id, "marcus@example.com");
        assert_ne!(second.id, first.id);

        let err = depo
            .depositions()
            .reschedule(
                &ctx(at(-100)),
                &first.id,
                RescheduleInput {
                    start_at: at(86_400),
                    end_at: None,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DepoError::Deposition(DepositionError::InvalidState { .. })
        ));
    }

    #[test]
    fn reschedule_ignores_its_own_slot() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let deposition = schedule(&depo, &case_id, "marcus@example.com");
        let moved = depo
            .depositions()
            .reschedule(
                &ctx(at(-100)),
                &deposition.id,
                RescheduleInput {
                    start_at: at(1800),
                    end_at: Some(at(5400)),
                },
            )
            .unwrap();
        assert_eq!(moved.start_at, at(1800));
        assert_eq!(moved.end_at, Some(at(5400)));
    }

    #[test]
    fn schedule_requires_existing_case() {
        let depo = setup();
        let err = depo
            .depositions()
            .schedule(
                &ctx(at(-100)),
                ScheduleDepositionInput {
                    case_id: CaseId::generate(),
                    witness_name: "Marcus Ode".to_string(),
                    witness_email: "marcus@example.com".to_string(),
                    start_at: t0(),
                    end_at: None,
                    video_recording: false,
                },
            )
            .unwrap_err();
        assert!(matches!(err, DepoError::Case(_)));
    }

    #[test]
    fn composition_requires_timeline_and_valid_transitions() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let id = schedule(&depo, &case_id, "marcus@example.com").id;

        let err = depo
            .compositions()
            .create_from_recording(&ctx(at(10)), &id, at(10))
            .unwrap_err();
        assert!(matches!(err, DepoError::Composition(CompositionError::NoEvents)));

        depo.timeline().start(&ctx(at(0)), &id).unwrap();
        let composition = depo
            .compositions()
            .create_from_recording(&ctx(at(10)), &id, at(10))
            .unwrap();
        assert!(composition.intervals.is_empty());

        let err = depo
            .compositions()
            .update_status(
                &ctx(at(20)),
                &composition.id,
                UpdateCompositionInput {
                    status: CompositionStatus::Available,
                    media_uri: None,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DepoError::Composition(CompositionError::InvalidInput { .. })
        ));

        let available = depo
            .compositions()
            .update_status(
                &ctx(at(20)),
                &composition.id,
                UpdateCompositionInput {
                    status: CompositionStatus::Available,
                    media_uri: Some("s3://depo-media/compositions/castillo.mp4".to_string()),
                },
            )
            .unwrap();
        assert_eq!(available.status, CompositionStatus::Available);

        let completed = depo
            .compositions()
            .update_status(
                &ctx(at(30)),
                &composition.id,
                UpdateCompositionInput {
                    status: CompositionStatus::Completed,
                    media_uri: None,
                },
            )
            .unwrap();
        assert_eq!(
            completed.media_uri.as_deref(),
            Some("s3://depo-media/compositions/castillo.mp4")
        );
        assert_eq!(
            depo.compositions().latest(&id).unwrap().map(|c| c.id),
            Some(composition.id)
        );
    }

    #[test]
    fn transcriptions_require_live_deposition() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let id = schedule(&depo, &case_id, "marcus@example.com").id;
        let err = depo
            .transcriptions()
            .add(
                &ctx(at(5)),
                AddTranscriptionInput {
                    deposition_id: id.clone(),
                    speaker_email: None,
                    text: "Good morning.".to_string(),
                    at: at(5),
                    duration_ms: 800,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DepoError::Transcription(TranscriptionError::DepositionNotInProgress)
        ));

        let err = depo.transcriptions().timed(&id).unwrap_err();
        assert!(matches!(err, DepoError::Composition(CompositionError::NotFound)));
    }

    #[test]
    fn participants_are_unique_per_deposition() {
        let depo = setup();
        let case_id = seed_case(&depo);
        let id = schedule(&depo, &case_id, "marcus@example.com").id;
        let input = AddParticipantInput {
            name: "Ellen Park".to_string(),
            email: "ellen.park@example.com".to_string(),
            role: ParticipantRole::CourtReporter,
        };
        let added = depo
            .depositions()
            .add_participant(&ctx(at(-10)), &id, input.clone())
            .unwrap();
        let err = depo
            .depositions()
            .add_participant(&ctx(at(-10)), &id, input)
            .unwrap_err();
        assert!(matches!(err, DepoError::Deposition(DepositionError::Conflict { .. })));

        depo.depositions()
            .remove_participant(&ctx(at(-5)), &id, &added.id)
            .unwrap();
        assert!(depo.depositions().participants(&id).unwrap().is_empty());
        let err = depo
            .depositions()
            .remove_participant(&ctx(at(-5)), &id, &added.id)
            .unwrap_err();
        assert!(matches!(
            err,
            DepoError::Deposition(DepositionError::ParticipantNotFound)
        ));
    }

    #[test]
    fn mutations_are_logged_and_published() {
        let conn = with_test_db().unwrap();
        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let depo = Depo::new(DbStore::new(conn), bus);
        let case_id = seed_case(&depo);
        schedule(&depo, &case_id, "marcus@example.com");

        let events = depo.events().list(None, None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].body["type"], "CaseCreated");
        assert_eq!(events[1].body["type"], "DepositionScheduled");
        assert_eq!(events[1].correlation_id.as_deref(), Some("corr_test"));
        assert_eq!(depo.events().list(Some(1), Some(10)).unwrap().len(), 1);

        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert_eq!(rx.try_recv().unwrap().seq, 2);
    }
}
