//! Presenter-facing controller.
//!
//! A [`WeatherSession`] turns user intents (search for a city, use my
//! location) into fetches and delivers each outcome as one [`WeatherEvent`]
//! on a single-subscriber channel. The presenter owns the receiver and
//! renders on its own context.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::{
    error::FetchError,
    fetcher::WeatherService,
    location::{LocationError, LocationSource},
    model::WeatherReading,
    query::WeatherQuery,
};

#[derive(Debug)]
pub enum WeatherEvent {
    Updated(WeatherReading),
    Failed(SessionError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Search text is empty")]
    EmptySearch,

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl SessionError {
    /// Message suitable for showing next to the search field.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptySearch => "Type something".to_string(),
            Self::Location(LocationError::PermissionDenied) => {
                "Location access was denied".to_string()
            }
            Self::Location(LocationError::Unavailable) => {
                "Location unavailable".to_string()
            }
            Self::Location(err) => err.to_string(),
            Self::Fetch(err) => err.user_message(),
        }
    }
}

#[derive(Debug)]
pub struct WeatherSession<S, L> {
    service: S,
    location: L,
    events: mpsc::UnboundedSender<WeatherEvent>,
}

impl<S, L> WeatherSession<S, L>
where
    S: WeatherService,
    L: LocationSource,
{
    pub fn new(service: S, location: L) -> (Self, mpsc::UnboundedReceiver<WeatherEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { service, location, events }, rx)
    }

    /// Fetch weather for free-form search text.
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) {
        let outcome = match WeatherQuery::city(text) {
            Ok(query) => self.service.fetch(&query).await.map_err(SessionError::from),
            Err(_) => Err(SessionError::EmptySearch),
        };
        self.publish(outcome);
    }

    /// Ask the location source for one fix, then fetch weather there.
    #[instrument(skip(self))]
    pub async fn locate(&self) {
        let outcome = match self.location.current_location().await {
            Ok(coordinates) => self
                .service
                .fetch(&coordinates.into())
                .await
                .map_err(SessionError::from),
            Err(err) => Err(SessionError::from(err)),
        };
        self.publish(outcome);
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, query: WeatherQuery) {
        let outcome = self.service.fetch(&query).await.map_err(SessionError::from);
        self.publish(outcome);
    }

    fn publish(&self, outcome: Result<WeatherReading, SessionError>) {
        let event = match outcome {
            Ok(reading) => WeatherEvent::Updated(reading),
            Err(err) => WeatherEvent::Failed(err),
        };

        if self.events.send(event).is_err() {
            debug!("no subscriber for weather event; dropping it");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Coordinates;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct StubService {
        seen: Mutex<Vec<WeatherQuery>>,
        fail_with_status: Option<u16>,
    }

    #[async_trait]
    impl WeatherService for StubService {
        async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReading, FetchError> {
            self.seen.lock().unwrap().push(query.clone());

            if let Some(status) = self.fail_with_status {
                return Err(FetchError::InvalidResponse { status, body: String::new() });
            }

            Ok(WeatherReading {
                temperature_celsius: 11.5,
                condition_code: 800,
                city_name: query.to_string(),
            })
        }
    }

    #[derive(Debug)]
    struct StubLocation(Result<Coordinates, LocationError>);

    #[async_trait]
    impl LocationSource for StubLocation {
        async fn current_location(&self) -> Result<Coordinates, LocationError> {
            self.0.clone()
        }
    }

    fn london() -> Coordinates {
        Coordinates { latitude: 51.5, longitude: -0.12 }
    }

    #[tokio::test]
    async fn search_emits_updated_reading() {
        let (session, mut rx) =
            WeatherSession::new(StubService::default(), StubLocation(Ok(london())));

        session.search("  London ").await;

        match rx.recv().await {
            Some(WeatherEvent::Updated(reading)) => assert_eq!(reading.city_name, "London"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(
            *session.service.seen.lock().unwrap(),
            vec![WeatherQuery::City("London".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_search_fails_without_fetching() {
        let (session, mut rx) =
            WeatherSession::new(StubService::default(), StubLocation(Ok(london())));

        session.search("   ").await;

        match rx.recv().await {
            Some(WeatherEvent::Failed(err)) => {
                assert!(matches!(err, SessionError::EmptySearch));
                assert_eq!(err.user_message(), "Type something");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(session.service.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn locate_fetches_by_coordinates() {
        let (session, mut rx) =
            WeatherSession::new(StubService::default(), StubLocation(Ok(london())));

        session.locate().await;

        assert!(matches!(rx.recv().await, Some(WeatherEvent::Updated(_))));
        assert_eq!(
            *session.service.seen.lock().unwrap(),
            vec![WeatherQuery::Coordinates(london())]
        );
    }

    #[tokio::test]
    async fn location_failure_is_surfaced_not_retried() {
        let (session, mut rx) = WeatherSession::new(
            StubService::default(),
            StubLocation(Err(LocationError::PermissionDenied)),
        );

        session.locate().await;

        match rx.recv().await {
            Some(WeatherEvent::Failed(SessionError::Location(LocationError::PermissionDenied))) => {}
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(session.service.seen.lock().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn user_messages_name_no_front_end() {
        let err = SessionError::Location(LocationError::Unavailable);
        assert_eq!(err.user_message(), "Location unavailable");

        let err = SessionError::Fetch(FetchError::InvalidResponse { status: 401, body: String::new() });
        assert!(!err.user_message().contains("clima"));
    }

    #[tokio::test]
    async fn fetch_error_is_delivered_once() {
        let service = StubService { fail_with_status: Some(401), ..StubService::default() };
        let (session, mut rx) = WeatherSession::new(service, StubLocation(Ok(london())));

        session.fetch(WeatherQuery::Coordinates(london())).await;

        match rx.recv().await {
            Some(WeatherEvent::Failed(SessionError::Fetch(err))) => {
                assert_eq!(err.status(), Some(401))
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(session.service.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn overlapping_requests_deliver_in_completion_order() {
        let (session, mut rx) =
            WeatherSession::new(StubService::default(), StubLocation(Ok(london())));

        tokio::join!(session.search("Paris"), session.search("Rome"));

        let mut cities = Vec::new();
        while let Ok(WeatherEvent::Updated(reading)) = rx.try_recv() {
            cities.push(reading.city_name);
        }
        cities.sort();
        assert_eq!(cities, vec!["Paris", "Rome"]);
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_panic() {
        let (session, rx) =
            WeatherSession::new(StubService::default(), StubLocation(Ok(london())));
        drop(rx);

        session.search("Oslo").await;
    }
}
