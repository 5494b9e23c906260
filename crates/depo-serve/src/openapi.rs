use utoipa::OpenApi;

use crate::routes::compositions::RecordingCompletedInput;
use crate::routes::events::EventsQuery;
use crate::routes::timeline::IntervalsQuery;
use crate::routes::transcriptions::TranscriptionBody;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use depo_core::types::io::{
    AddParticipantInput, CreateCaseInput, DepositionFilter, RescheduleInput,
    ScheduleDepositionInput, UpdateCompositionInput,
};
use depo_core::types::{
    Case, CaseId, Composition, CompositionId, CompositionStatus, Deposition, DepositionEvent,
    DepositionEventId, DepositionEventKind, DepositionId, DepositionStatus, Participant,
    ParticipantId, ParticipantRole, RecordingInterval, TimedTranscription, Transcription,
    TranscriptionId,
};
use depo_events::types::{EventRecord, EventSource};

#[derive(OpenApi)]
#[openapi(
    info(title = "Depo API", description = "Deposition scheduling and recording"),
    paths(
        crate::routes::cases::create_case,
        crate::routes::cases::list_cases,
        crate::routes::cases::get_case,
        crate::routes::depositions::schedule_deposition,
        crate::routes::depositions::list_depositions,
        crate::routes::depositions::get_deposition,
        crate::routes::depositions::reschedule_deposition,
        crate::routes::depositions::confirm_deposition,
        crate::routes::depositions::cancel_deposition,
        crate::routes::depositions::add_participant,
        crate::routes::depositions::list_participants,
        crate::routes::depositions::remove_participant,
        crate::routes::timeline::start_deposition,
        crate::routes::timeline::go_on_record,
        crate::routes::timeline::go_off_record,
        crate::routes::timeline::join_deposition,
        crate::routes::timeline::leave_deposition,
        crate::routes::timeline::end_deposition,
        crate::routes::timeline::list_timeline,
        crate::routes::timeline::recording_intervals,
        crate::routes::compositions::create_composition,
        crate::routes::compositions::latest_composition,
        crate::routes::compositions::get_composition,
        crate::routes::compositions::update_composition_status,
        crate::routes::transcriptions::add_transcription,
        crate::routes::transcriptions::list_transcriptions,
        crate::routes::transcriptions::timed_transcriptions,
        crate::routes::events::list_events,
        crate::routes::events::stream,
    ),
    components(schemas(
        Case,
        CreateCaseInput,
        Deposition,
        ScheduleDepositionInput,
        RescheduleInput,
        DepositionFilter,
        Participant,
        AddParticipantInput,
        DepositionEvent,
        IntervalsQuery,
        RecordingInterval,
        Composition,
        RecordingCompletedInput,
        UpdateCompositionInput,
        Transcription,
        TranscriptionBody,
        TimedTranscription,
        EventRecord,
        EventsQuery,
        CaseId,
        DepositionId,
        ParticipantId,
        DepositionEventId,
        CompositionId,
        TranscriptionId,
        DepositionStatus,
        ParticipantRole,
        DepositionEventKind,
        CompositionStatus,
        EventSource
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
    Html(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Depo API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#,
    )
}
