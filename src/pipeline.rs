use chrono::Local;
use futures::future::try_join3;
use kube::core::DynamicObject;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ViewError;
use crate::k8s::KanisterApi;
use crate::model::{ActionSet, Blueprint, Collection, Profile};
use crate::normalize::normalize_all;
use crate::view::ViewModel;

struct Fetched {
    profiles: Vec<DynamicObject>,
    blueprints: Vec<DynamicObject>,
    action_sets: Vec<DynamicObject>,
}

/// Fetches, normalizes, classifies and assembles one view of `namespace`.
///
/// The three collections are fetched concurrently. The first failure, a
/// cancelled `token` or an expired `deadline` drops the remaining fetches.
pub async fn build_view<A: KanisterApi>(
    api: &A,
    namespace: &str,
    token: &CancellationToken,
    deadline: Duration,
) -> Result<ViewModel, ViewError> {
    let fetched = tokio::select! {
        biased;
        () = token.cancelled() => return Err(ViewError::Cancelled),
        result = timeout(deadline, fetch_all(api, namespace)) => match result {
            Ok(fetched) => fetched?,
            Err(_) => return Err(ViewError::DeadlineExceeded(deadline)),
        },
    };

    let profiles: Vec<Profile> = normalize_all(Collection::Profiles, &fetched.profiles)?;
    let blueprints: Vec<Blueprint> = normalize_all(Collection::Blueprints, &fetched.blueprints)?;
    let action_sets: Vec<ActionSet> =
        normalize_all(Collection::ActionSets, &fetched.action_sets)?;

    debug!(
        namespace,
        profiles = profiles.len(),
        blueprints = blueprints.len(),
        action_sets = action_sets.len(),
        "assembling view"
    );

    Ok(ViewModel::assemble(
        namespace,
        Local::now(),
        profiles,
        blueprints,
        action_sets,
    ))
}

async fn fetch_all<A: KanisterApi>(api: &A, namespace: &str) -> Result<Fetched, ViewError> {
    let (profiles, blueprints, action_sets) = try_join3(
        fetch(api, Collection::Profiles, namespace),
        fetch(api, Collection::Blueprints, namespace),
        fetch(api, Collection::ActionSets, namespace),
    )
    .await?;

    Ok(Fetched {
        profiles,
        blueprints,
        action_sets,
    })
}

async fn fetch<A: KanisterApi>(
    api: &A,
    collection: Collection,
    namespace: &str,
) -> Result<Vec<DynamicObject>, ViewError> {
    api.list(collection, namespace)
        .await
        .map_err(|source| ViewError::Fetch {
            collection,
            source: source.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::fake::FakeKanisterApi;
    use serde_json::json;

    const DEADLINE: Duration = Duration::from_secs(5);

    fn populated() -> FakeKanisterApi {
        FakeKanisterApi::default()
            .with_items(
                Collection::Profiles,
                vec![json!({
                    "metadata": { "name": "minio-profile" },
                    "location": { "type": "s3Compliant", "bucket": "backups" }
                })],
            )
            .with_items(
                Collection::Blueprints,
                vec![
                    json!({ "metadata": { "name": "redis-blueprint" } }),
                    json!({ "metadata": { "name": "custom-bp" } }),
                ],
            )
            .with_items(
                Collection::ActionSets,
                vec![
                    json!({ "metadata": { "name": "as-1" }, "status": { "state": "failed" } }),
                    json!({ "metadata": { "name": "as-2" }, "status": { "state": "running" } }),
                ],
            )
    }

    #[tokio::test]
    async fn builds_a_classified_view() {
        let view = build_view(&populated(), "kanister", &CancellationToken::new(), DEADLINE)
            .await
            .unwrap();

        assert_eq!(view.namespace, "kanister");
        assert_eq!(view.profiles[0].icon.map(|icon| icon.key), Some("s3"));
        assert_eq!(view.blueprints[0].icon.key, "redis");
        assert_eq!(view.blueprints[1].icon.key, "default");
        assert_eq!(view.action_sets[0].status_class, Some("failed-status"));
        assert_eq!(view.action_sets[1].status_class, None);
    }

    #[tokio::test]
    async fn any_fetch_failure_aborts_the_view() {
        for collection in [
            Collection::Profiles,
            Collection::Blueprints,
            Collection::ActionSets,
        ] {
            let api = populated().failing(collection, "forbidden");

            let error = build_view(&api, "kanister", &CancellationToken::new(), DEADLINE)
                .await
                .unwrap_err();

            assert_eq!(error.stage(), "fetch");
            assert_eq!(error.collection(), Some(collection));
        }
    }

    #[tokio::test]
    async fn malformed_objects_abort_the_view() {
        let api = populated().with_items(
            Collection::ActionSets,
            vec![json!({ "metadata": { "name": "as-1" }, "spec": { "actions": "nope" } })],
        );

        let error = build_view(&api, "kanister", &CancellationToken::new(), DEADLINE)
            .await
            .unwrap_err();

        assert_eq!(error.stage(), "normalize");
        assert_eq!(error.collection(), Some(Collection::ActionSets));
    }

    #[tokio::test]
    async fn a_failure_wins_over_a_hanging_fetch() {
        let api = populated()
            .hanging(Collection::Profiles)
            .failing(Collection::Blueprints, "boom");

        let error = build_view(&api, "kanister", &CancellationToken::new(), DEADLINE)
            .await
            .unwrap_err();

        assert_eq!(error.collection(), Some(Collection::Blueprints));
    }

    #[tokio::test]
    async fn cancellation_abandons_in_flight_fetches() {
        let api = populated().hanging(Collection::ActionSets);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let error = build_view(&api, "kanister", &token, DEADLINE)
            .await
            .unwrap_err();

        assert!(matches!(error, ViewError::Cancelled));
    }

    #[tokio::test]
    async fn an_already_cancelled_token_fetches_nothing() {
        let token = CancellationToken::new();
        token.cancel();

        let error = build_view(&populated(), "kanister", &token, DEADLINE)
            .await
            .unwrap_err();

        assert!(matches!(error, ViewError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_deadline_is_reported() {
        let api = populated().hanging(Collection::Blueprints);
        let deadline = Duration::from_secs(2);

        let error = build_view(&api, "kanister", &CancellationToken::new(), deadline)
            .await
            .unwrap_err();

        assert!(matches!(error, ViewError::DeadlineExceeded(d) if d == deadline));
    }
}
