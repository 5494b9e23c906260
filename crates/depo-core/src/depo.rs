use crate::cases::CaseRepository;
use crate::compositions::CompositionRepository;
use crate::depositions::{DepositionRepository, ParticipantRepository};
use crate::error::{
    CaseError, CompositionError, DepoError, DepositionError, TranscriptionError,
};
use crate::events::EventRepository;
use crate::recording::{compute_recording_intervals, is_on_record, recording_anchor};
use crate::schedule::{validate_no_conflict, validate_schedule_window, ScheduleRules, ScheduleWindow};
use crate::store::Store;
use crate::timeline::TimelineRepository;
use crate::timing::retime_transcriptions;
use crate::transcriptions::TranscriptionRepository;
use crate::types::event::EventBody;
use crate::types::io::{
    AddParticipantInput, AddTranscriptionInput, CreateCaseInput, DepositionFilter,
    RescheduleInput, ScheduleDepositionInput, UpdateCompositionInput,
};
use crate::types::{
    Case, CaseId, Composition, CompositionId, CompositionStatus, Deposition, DepositionEvent,
    DepositionEventKind, DepositionId, DepositionStatus, Participant, ParticipantId,
    RecordingInterval, TimedTranscription, Transcription,
};
use crate::validation::{
    require_email, require_text, validate_composition_transition, validate_deposition_transition,
};
use chrono::{DateTime, Utc};
use depo_events::bus::EventBus;
use depo_events::types::{EventRecord, EventSource};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: EventSource,
    pub correlation_id: Option<String>,
    pub actor_email: Option<String>,
    /// When the request was received. Timeline entries are stamped with it.
    pub at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
            actor_email: None,
            at: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_email: Option<String>) -> Self {
        self.actor_email = actor_email;
        self
    }

    pub fn with_time(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

pub struct Depo<S: Store> {
    store: S,
    event_bus: EventBus,
    rules: ScheduleRules,
}

impl<S: Store> Depo<S> {
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            rules: ScheduleRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: ScheduleRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn cases(&self) -> CasesApi<'_, S> {
        CasesApi { core: self }
    }

    pub fn depositions(&self) -> DepositionsApi<'_, S> {
        DepositionsApi { core: self }
    }

    pub fn timeline(&self) -> TimelineApi<'_, S> {
        TimelineApi { core: self }
    }

    pub fn compositions(&self) -> CompositionsApi<'_, S> {
        CompositionsApi { core: self }
    }

    pub fn transcriptions(&self) -> TranscriptionsApi<'_, S> {
        TranscriptionsApi { core: self }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    fn with_events<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, DepoError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<EventBody>), DepoError>,
    {
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::new();
            for body in bodies {
                let record = build_event_record(ctx, body)?;
                let record = store.events().append(record)?;
                records.push(record);
            }
            Ok((value, records))
        })?;
        for record in records {
            let seq = record.seq;
            if self.event_bus.publish(record).is_err() {
                debug!(seq, "no subscribers for activity event");
            }
        }
        Ok(value)
    }
}

fn build_event_record(ctx: &RequestContext, body: EventBody) -> Result<EventRecord, DepoError> {
    let value = serde_json::to_value(body).map_err(DepoError::internal)?;
    Ok(EventRecord {
        id: String::new(),
        seq: 0,
        at: Utc::now(),
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        body: value,
    })
}

fn load_deposition<S: Store>(store: &S, id: &DepositionId) -> Result<Deposition, DepoError> {
    store
        .depositions()
        .get(id)?
        .ok_or(DepoError::Deposition(DepositionError::NotFound))
}

fn require_in_progress(deposition: &Deposition) -> Result<(), DepositionError> {
    if deposition.status == DepositionStatus::InProgress {
        Ok(())
    } else {
        Err(DepositionError::InvalidState {
            message: format!("deposition is {:?}, not InProgress", deposition.status),
        })
    }
}

fn change_status<S: Store>(
    store: &S,
    deposition: &Deposition,
    to: DepositionStatus,
) -> Result<(Deposition, EventBody), DepoError> {
    let from = deposition.status;
    validate_deposition_transition(from, to)?;
    let updated = store.depositions().set_status(&deposition.id, to)?;
    info!(deposition_id = %updated.id, ?from, ?to, "deposition status changed");
    let body = EventBody::DepositionStatusChanged {
        deposition: updated.clone(),
        from,
        to,
    };
    Ok((updated, body))
}

fn append_timeline<S: Store>(
    store: &S,
    ctx: &RequestContext,
    deposition_id: &DepositionId,
    kind: DepositionEventKind,
) -> Result<(DepositionEvent, EventBody), DepoError> {
    let event = store
        .timeline()
        .append(deposition_id, kind, ctx.at, ctx.actor_email.clone())?;
    debug!(deposition_id = %deposition_id, ?kind, "timeline event appended");
    let body = EventBody::TimelineAppended {
        event: event.clone(),
    };
    Ok((event, body))
}

pub struct CasesApi<'a, S: Store> {
    core: &'a Depo<S>,
}

impl<'a, S: Store> CasesApi<'a, S> {
    pub fn create(&self, ctx: &RequestContext, input: CreateCaseInput) -> Result<Case, DepoError> {
        let input = CreateCaseInput {
            name: require_text("name", &input.name)
                .map_err(|message| CaseError::InvalidInput { message })?,
            case_number: require_text("case_number", &input.case_number)
                .map_err(|message| CaseError::InvalidInput { message })?,
        };
        self.core.with_events(ctx, |store| {
            let case = store.cases().create(input)?;
            info!(case_id = %case.id, "case created");
            Ok((case.clone(), vec![EventBody::CaseCreated { case }]))
        })
    }

    pub fn get(&self, id: &CaseId) -> Result<Option<Case>, DepoError> {
        self.core.store.cases().get(id).map_err(DepoError::from)
    }

    pub fn list(&self) -> Result<Vec<Case>, DepoError> {
        self.core.store.cases().list().map_err(DepoError::from)
    }
}

pub struct DepositionsApi<'a, S: Store> {
    core: &'a Depo<S>,
}

impl<'a, S: Store> DepositionsApi<'a, S> {
    pub fn schedule(
        &self,
        ctx: &RequestContext,
        input: ScheduleDepositionInput,
    ) -> Result<Deposition, DepoError> {
        let input = ScheduleDepositionInput {
            witness_name: require_text("witness_name", &input.witness_name)
                .map_err(|message| DepositionError::InvalidInput { message })?,
            witness_email: require_email("witness_email", &input.witness_email)
                .map_err(|message| DepositionError::InvalidInput { message })?,
            ..input
        };
        let rules = self.core.rules;
        self.core.with_events(ctx, |store| {
            if store.cases().get(&input.case_id)?.is_none() {
                return Err(DepoError::Case(CaseError::NotFound));
            }

            let window = ScheduleWindow {
                id: None,
                witness_email: &input.witness_email,
                start_at: input.start_at,
                end_at: input.end_at,
            };
            validate_schedule_window(&window, ctx.at, &rules)?;
            let existing = store.depositions().list_for_witness(&input.witness_email)?;
            if let Err(err) = validate_no_conflict(&window, &existing, &rules) {
                warn!(witness = %input.witness_email, %err, "schedule rejected");
                return Err(err.into());
            }

            let deposition = store.depositions().create(input)?;
            info!(deposition_id = %deposition.id, case_id = %deposition.case_id, "deposition scheduled");
            Ok((
                deposition.clone(),
                vec![EventBody::DepositionScheduled { deposition }],
            ))
        })
    }

    pub fn get(&self, id: &DepositionId) -> Result<Option<Deposition>, DepoError> {
        self.core
            .store
            .depositions()
            .get(id)
            .map_err(DepoError::from)
    }

    pub fn list(&self, filter: DepositionFilter) -> Result<Vec<Deposition>, DepoError> {
        self.core
            .store
            .depositions()
            .list(filter)
            .map_err(DepoError::from)
    }

    pub fn reschedule(
        &self,
        ctx: &RequestContext,
        id: &DepositionId,
        input: RescheduleInput,
    ) -> Result<Deposition, DepoError> {
        let rules = self.core.rules;
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, id)?;
            if !matches!(
                deposition.status,
                DepositionStatus::Pending | DepositionStatus::Confirmed
            ) {
                return Err(DepoError::Deposition(DepositionError::InvalidState {
                    message: format!("cannot reschedule a {:?} deposition", deposition.status),
                }));
            }

            let window = ScheduleWindow {
                id: Some(&deposition.id),
                witness_email: &deposition.witness_email,
                start_at: input.start_at,
                end_at: input.end_at,
            };
            validate_schedule_window(&window, ctx.at, &rules)?;
            let existing = store
                .depositions()
                .list_for_witness(&deposition.witness_email)?;
            validate_no_conflict(&window, &existing, &rules)?;

            let updated = store
                .depositions()
                .reschedule(id, input.start_at, input.end_at)?;
            info!(deposition_id = %updated.id, start_at = %updated.start_at, "deposition rescheduled");
            Ok((
                updated.clone(),
                vec![EventBody::DepositionRescheduled {
                    deposition: updated,
                }],
            ))
        })
    }

    pub fn confirm(&self, ctx: &RequestContext, id: &DepositionId) -> Result<Deposition, DepoError> {
        self.set_status(ctx, id, DepositionStatus::Confirmed)
    }

    pub fn cancel(&self, ctx: &RequestContext, id: &DepositionId) -> Result<Deposition, DepoError> {
        self.set_status(ctx, id, DepositionStatus::Canceled)
    }

    fn set_status(
        &self,
        ctx: &RequestContext,
        id: &DepositionId,
        to: DepositionStatus,
    ) -> Result<Deposition, DepoError> {
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, id)?;
            let (updated, body) = change_status(store, &deposition, to)?;
            Ok((updated, vec![body]))
        })
    }

    pub fn add_participant(
        &self,
        ctx: &RequestContext,
        id: &DepositionId,
        input: AddParticipantInput,
    ) -> Result<Participant, DepoError> {
        let input = AddParticipantInput {
            name: require_text("name", &input.name)
                .map_err(|message| DepositionError::InvalidInput { message })?,
            email: require_email("email", &input.email)
                .map_err(|message| DepositionError::InvalidInput { message })?,
            role: input.role,
        };
        self.core.with_events(ctx, |store| {
            load_deposition(store, id)?;
            let existing = store.participants().list(id)?;
            if existing.iter().any(|p| p.email == input.email) {
                return Err(DepoError::Deposition(DepositionError::Conflict {
                    message: format!("{} already participates", input.email),
                }));
            }
            let participant = store.participants().add(id, input)?;
            info!(deposition_id = %id, participant_id = %participant.id, "participant added");
            Ok((
                participant.clone(),
                vec![EventBody::ParticipantAdded { participant }],
            ))
        })
    }

    pub fn remove_participant(
        &self,
        ctx: &RequestContext,
        id: &DepositionId,
        participant_id: &ParticipantId,
    ) -> Result<(), DepoError> {
        self.core.with_events(ctx, |store| {
            store.participants().remove(id, participant_id)?;
            Ok((
                (),
                vec![EventBody::ParticipantRemoved {
                    deposition_id: id.clone(),
                    participant_id: participant_id.clone(),
                }],
            ))
        })
    }

    pub fn participants(&self, id: &DepositionId) -> Result<Vec<Participant>, DepoError> {
        load_deposition(&self.core.store, id)?;
        self.core
            .store
            .participants()
            .list(id)
            .map_err(DepoError::from)
    }
}

pub struct TimelineApi<'a, S: Store> {
    core: &'a Depo<S>,
}

impl<'a, S: Store> TimelineApi<'a, S> {
    pub fn start(&self, ctx: &RequestContext, id: &DepositionId) -> Result<Deposition, DepoError> {
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, id)?;
            let (updated, status_body) = change_status(store, &deposition, DepositionStatus::InProgress)?;
            let (_, timeline_body) =
                append_timeline(store, ctx, id, DepositionEventKind::StartDeposition)?;
            Ok((updated, vec![status_body, timeline_body]))
        })
    }

    pub fn go_on_record(
        &self,
        ctx: &RequestContext,
        id: &DepositionId,
    ) -> Result<DepositionEvent, DepoError> {
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, id)?;
            require_in_progress(&deposition)?;
            if is_on_record(&store.timeline().list(id)?) {
                return Err(DepoError::Deposition(DepositionError::AlreadyOnRecord));
            }
            let (event, body) = append_timeline(store, ctx, id, DepositionEventKind::OnTheRecord)?;
            info!(deposition_id = %id, "on the record");
            Ok((event, vec![body]))
        })
    }

    pub fn go_off_record(
        &self,
        ctx: &RequestContext,
        id: &DepositionId,
    ) -> Result<DepositionEvent, DepoError> {
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, id)?;
            require_in_progress(&deposition)?;
            if !is_on_record(&store.timeline().list(id)?) {
                return Err(DepoError::Deposition(DepositionError::NotOnRecord));
            }
            let (event, body) = append_timeline(store, ctx, id, DepositionEventKind::OffTheRecord)?;
            info!(deposition_id = %id, "off the record");
            Ok((event, vec![body]))
        })
    }

    pub fn join(&self, ctx: &RequestContext, id: &DepositionId) -> Result<DepositionEvent, DepoError> {
        self.presence(ctx, id, DepositionEventKind::ParticipantJoined)
    }

    pub fn leave(&self, ctx: &RequestContext, id: &DepositionId) -> Result<DepositionEvent, DepoError> {
        self.presence(ctx, id, DepositionEventKind::ParticipantLeft)
    }

    fn presence(
        &self,
        ctx: &RequestContext,
        id: &DepositionId,
        kind: DepositionEventKind,
    ) -> Result<DepositionEvent, DepoError> {
        if ctx.actor_email.is_none() {
            return Err(DepoError::Deposition(DepositionError::InvalidInput {
                message: "actor email is required".to_string(),
            }));
        }
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, id)?;
            require_in_progress(&deposition)?;
            let (event, body) = append_timeline(store, ctx, id, kind)?;
            Ok((event, vec![body]))
        })
    }

    /// Closes an open record span before ending, so the final interval
    /// stops at the end of the deposition.
    pub fn end(&self, ctx: &RequestContext, id: &DepositionId) -> Result<Deposition, DepoError> {
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, id)?;
            validate_deposition_transition(deposition.status, DepositionStatus::Completed)?;
            let mut bodies = Vec::new();
            if is_on_record(&store.timeline().list(id)?) {
                let (_, body) = append_timeline(store, ctx, id, DepositionEventKind::OffTheRecord)?;
                bodies.push(body);
            }
            let (_, body) = append_timeline(store, ctx, id, DepositionEventKind::EndDeposition)?;
            bodies.push(body);
            let (updated, status_body) = change_status(store, &deposition, DepositionStatus::Completed)?;
            bodies.push(status_body);
            Ok((updated, bodies))
        })
    }

    pub fn list(&self, id: &DepositionId) -> Result<Vec<DepositionEvent>, DepoError> {
        load_deposition(&self.core.store, id)?;
        self.core.store.timeline().list(id).map_err(DepoError::from)
    }

    pub fn recording_intervals(
        &self,
        id: &DepositionId,
        reference_now: DateTime<Utc>,
    ) -> Result<Vec<RecordingInterval>, DepoError> {
        let events = self.list(id)?;
        Ok(compute_recording_intervals(&events, reference_now))
    }
}

pub struct CompositionsApi<'a, S: Store> {
    core: &'a Depo<S>,
}

impl<'a, S: Store> CompositionsApi<'a, S> {
    /// Handles a "recording completed" callback: snapshots the intervals
    /// as of `completed_at` into a queued composition.
    pub fn create_from_recording(
        &self,
        ctx: &RequestContext,
        deposition_id: &DepositionId,
        completed_at: DateTime<Utc>,
    ) -> Result<Composition, DepoError> {
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, deposition_id)?;
            if !deposition.video_recording {
                return Err(DepoError::Composition(CompositionError::InvalidInput {
                    message: "deposition is not video recorded".to_string(),
                }));
            }
            let events = store.timeline().list(deposition_id)?;
            if events.is_empty() {
                return Err(DepoError::Composition(CompositionError::NoEvents));
            }
            let intervals = compute_recording_intervals(&events, completed_at);
            let composition = store.compositions().create(
                deposition_id,
                recording_anchor(&events),
                intervals,
            )?;
            info!(
                composition_id = %composition.id,
                deposition_id = %deposition_id,
                intervals = composition.intervals.len(),
                "composition queued"
            );
            Ok((
                composition.clone(),
                vec![EventBody::CompositionCreated { composition }],
            ))
        })
    }

    pub fn get(&self, id: &CompositionId) -> Result<Option<Composition>, DepoError> {
        self.core
            .store
            .compositions()
            .get(id)
            .map_err(DepoError::from)
    }

    pub fn latest(&self, deposition_id: &DepositionId) -> Result<Option<Composition>, DepoError> {
        self.core
            .store
            .compositions()
            .latest_for_deposition(deposition_id)
            .map_err(DepoError::from)
    }

    pub fn update_status(
        &self,
        ctx: &RequestContext,
        id: &CompositionId,
        input: UpdateCompositionInput,
    ) -> Result<Composition, DepoError> {
        self.core.with_events(ctx, |store| {
            let composition = store
                .compositions()
                .get(id)?
                .ok_or(DepoError::Composition(CompositionError::NotFound))?;
            let from = composition.status;
            validate_composition_transition(from, input.status)?;

            let media_uri = input.media_uri.or(composition.media_uri);
            if input.status == CompositionStatus::Available && media_uri.is_none() {
                return Err(DepoError::Composition(CompositionError::InvalidInput {
                    message: "media_uri is required once a composition is available".to_string(),
                }));
            }

            let updated = store
                .compositions()
                .update_status(id, input.status, media_uri)?;
            info!(composition_id = %id, ?from, to = ?updated.status, "composition status changed");
            Ok((
                updated.clone(),
                vec![EventBody::CompositionStatusChanged {
                    composition: updated,
                    from,
                    to: input.status,
                }],
            ))
        })
    }
}

pub struct TranscriptionsApi<'a, S: Store> {
    core: &'a Depo<S>,
}

impl<'a, S: Store> TranscriptionsApi<'a, S> {
    pub fn add(
        &self,
        ctx: &RequestContext,
        input: AddTranscriptionInput,
    ) -> Result<Transcription, DepoError> {
        let speaker_email = match input.speaker_email.as_deref() {
            Some(email) => Some(
                require_email("speaker_email", email)
                    .map_err(|message| TranscriptionError::InvalidInput { message })?,
            ),
            None => None,
        };
        let input = AddTranscriptionInput {
            text: require_text("text", &input.text)
                .map_err(|message| TranscriptionError::InvalidInput { message })?,
            speaker_email,
            ..input
        };
        self.core.with_events(ctx, |store| {
            let deposition = load_deposition(store, &input.deposition_id)?;
            if deposition.status != DepositionStatus::InProgress {
                return Err(DepoError::Transcription(
                    TranscriptionError::DepositionNotInProgress,
                ));
            }
            let transcription = store.transcriptions().add(input)?;
            Ok((
                transcription.clone(),
                vec![EventBody::TranscriptionAdded { transcription }],
            ))
        })
    }

    pub fn list(&self, deposition_id: &DepositionId) -> Result<Vec<Transcription>, DepoError> {
        load_deposition(&self.core.store, deposition_id)?;
        self.core
            .store
            .transcriptions()
            .list(deposition_id)
            .map_err(DepoError::from)
    }

    /// Places each transcription on the latest composition's trimmed timeline.
    pub fn timed(&self, deposition_id: &DepositionId) -> Result<Vec<TimedTranscription>, DepoError> {
        let transcriptions = self.list(deposition_id)?;
        let composition = self
            .core
            .store
            .compositions()
            .latest_for_deposition(deposition_id)?
            .ok_or(DepoError::Composition(CompositionError::NotFound))?;
        let timed = match composition.recording_anchor {
            Some(anchor) => retime_transcriptions(anchor, &composition.intervals, transcriptions),
            None => transcriptions
                .into_iter()
                .map(|transcription| TimedTranscription {
                    transcription,
                    offset_secs: 0,
                })
                .collect(),
        };
        Ok(timed)
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a Depo<S>,
}

impl<'a, S: Store> EventsApi<'a, S> {
    pub fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, DepoError> {
        self.core.store.events().list(after, limit)
    }
}
