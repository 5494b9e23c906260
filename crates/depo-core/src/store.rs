use crate::cases::CaseRepository;
use crate::compositions::CompositionRepository;
use crate::depositions::{DepositionRepository, ParticipantRepository};
use crate::events::EventRepository;
use crate::timeline::TimelineRepository;
use crate::transcriptions::TranscriptionRepository;
use crate::DepoError;

pub trait Store {
    type Cases<'a>: CaseRepository
    where
        Self: 'a;
    type Depositions<'a>: DepositionRepository
    where
        Self: 'a;
    type Participants<'a>: ParticipantRepository
    where
        Self: 'a;
    type Timeline<'a>: TimelineRepository
    where
        Self: 'a;
    type Compositions<'a>: CompositionRepository
    where
        Self: 'a;
    type Transcriptions<'a>: TranscriptionRepository
    where
        Self: 'a;
    type Events<'a>: EventRepository
    where
        Self: 'a;

    fn cases(&self) -> Self::Cases<'_>;
    fn depositions(&self) -> Self::Depositions<'_>;
    fn participants(&self) -> Self::Participants<'_>;
    fn timeline(&self) -> Self::Timeline<'_>;
    fn compositions(&self) -> Self::Compositions<'_>;
    fn transcriptions(&self) -> Self::Transcriptions<'_>;
    fn events(&self) -> Self::Events<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, DepoError>
    where
        F: FnOnce(&Self) -> Result<T, DepoError>;
}
