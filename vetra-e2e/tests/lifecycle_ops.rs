//! Lifecycle orchestration tests against the in-memory control plane

mod common;

use anyhow::Result;
use std::time::Duration;
use vetra_control::{
    CreateKafkaRequest, CreateRegistryRequest, InMemoryControlPlane, KafkaInstanceStatus,
    ProvisioningProfile, RegistryStatus, ResourceApi, ResourceKind,
};
use vetra_e2e::{E2eError, Lifecycle, LifecycleConfig, WaitConfig};

#[tokio::test]
async fn instance_becomes_ready_after_provisioning() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::with_profile(ProvisioningProfile {
        fetches_until_ready: 2,
        fetches_until_gone: 0,
    });
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    let name = common::unique_name("mk-e2e");
    let handle = lifecycle
        .api()
        .create(&CreateKafkaRequest::standard(&name))
        .await?;

    // observed sequence is [provisioning, provisioning, ready]
    let snapshot = lifecycle.wait_until_ready(&handle.id).await?;
    assert_eq!(snapshot.status, KafkaInstanceStatus::Ready);
    // the snapshot hands the full identity back to id-only callers
    assert_eq!(snapshot.handle, handle);
    Ok(())
}

#[tokio::test]
async fn apply_or_reuse_is_idempotent() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::new();
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    let name = common::unique_name("mk-e2e");
    let payload = CreateKafkaRequest::standard(&name);

    let first = lifecycle.apply_or_reuse(&payload).await?;
    let second = lifecycle.apply_or_reuse(&payload).await?;

    assert_eq!(first.id, second.id);
    assert_eq!(plane.creates_issued(ResourceKind::KafkaInstance), 1);
    Ok(())
}

#[tokio::test]
async fn apply_or_reuse_picks_up_leftover_resources() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::new();
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    let name = common::unique_name("mk-e2e");
    let leftover = plane.seed(ResourceKind::KafkaInstance, &name);

    let handle = lifecycle
        .apply_or_reuse(&CreateKafkaRequest::standard(&name))
        .await?;

    assert_eq!(handle.id, leftover.id);
    assert_eq!(plane.creates_issued(ResourceKind::KafkaInstance), 0);
    Ok(())
}

#[tokio::test]
async fn try_create_absorbs_conflicts() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::new();
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    let name = common::unique_name("mk-e2e");
    let payload = CreateKafkaRequest::standard(&name);
    lifecycle.api().create(&payload).await?;

    let outcome = lifecycle.try_create(&payload).await;
    assert!(outcome.is_already_exists());

    // one call per attempt; no delete, no retry
    assert_eq!(plane.creates_issued(ResourceKind::KafkaInstance), 2);
    assert_eq!(plane.deletes_issued(ResourceKind::KafkaInstance), 0);
    Ok(())
}

#[tokio::test]
async fn deletion_converges_through_deprovisioning() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::with_profile(ProvisioningProfile {
        fetches_until_ready: 0,
        fetches_until_gone: 2,
    });
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    let name = common::unique_name("mk-e2e");
    let handle = lifecycle
        .apply_or_reuse(&CreateKafkaRequest::standard(&name))
        .await?;

    lifecycle.delete_by_name_if_exists(&name).await?;
    lifecycle.wait_until_deleted(&handle.id).await?;

    // fetches report not-found from now on
    assert!(lifecycle.api().fetch_status(&handle.id).await.is_err());
    Ok(())
}

#[tokio::test]
async fn delete_by_name_removes_every_match() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::new();
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    let name = common::unique_name("mk-e2e");
    lifecycle
        .api()
        .create(&CreateKafkaRequest::standard(&name))
        .await?;
    // a second instance under the same name, left behind by another run
    plane.seed(ResourceKind::KafkaInstance, &name);

    lifecycle.delete_by_name_if_exists(&name).await?;

    assert_eq!(plane.deletes_issued(ResourceKind::KafkaInstance), 2);
    assert!(lifecycle.api().list_by_name(&name).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_by_name_tolerates_missing_resources() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::new();
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    lifecycle
        .delete_by_name_if_exists(&common::unique_name("mk-e2e-missing"))
        .await?;
    assert_eq!(plane.deletes_issued(ResourceKind::KafkaInstance), 0);
    Ok(())
}

#[tokio::test]
async fn ready_timeout_reports_last_observed_status() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::with_profile(ProvisioningProfile {
        fetches_until_ready: u32::MAX,
        fetches_until_gone: 0,
    });
    let config = common::fast_config().with_ready(WaitConfig::new(
        Duration::from_millis(10),
        Duration::from_millis(60),
    ));
    let lifecycle = Lifecycle::new(plane.kafka(), config);

    let name = common::unique_name("mk-e2e");
    let handle = lifecycle
        .api()
        .create(&CreateKafkaRequest::standard(&name))
        .await?;

    match lifecycle.wait_until_ready(&handle.id).await {
        Err(E2eError::ReadyTimeout { id, last, .. }) => {
            assert_eq!(id, handle.id);
            assert!(last.contains("provisioning"), "last: {}", last);
        }
        other => panic!("expected ready timeout, got {:?}", other.map(|s| s.status)),
    }
    Ok(())
}

#[tokio::test]
async fn failed_instance_aborts_the_readiness_wait() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::with_profile(ProvisioningProfile {
        fetches_until_ready: u32::MAX,
        fetches_until_gone: 0,
    });
    let lifecycle = Lifecycle::new(plane.kafka(), common::fast_config());

    let name = common::unique_name("mk-e2e");
    let handle = lifecycle
        .api()
        .create(&CreateKafkaRequest::standard(&name))
        .await?;
    plane.mark_failed(ResourceKind::KafkaInstance, &handle.id);

    match lifecycle.wait_until_ready(&handle.id).await {
        Err(E2eError::ResourceFailed { status, .. }) => assert_eq!(status, "failed"),
        other => panic!("expected failed-state abort, got {:?}", other.map(|s| s.status)),
    }
    Ok(())
}

#[tokio::test]
async fn registry_lifecycle_round_trip() -> Result<()> {
    common::init();
    let plane = InMemoryControlPlane::with_profile(ProvisioningProfile {
        fetches_until_ready: 1,
        fetches_until_gone: 1,
    });
    let config = LifecycleConfig::schema_registry()
        .with_ready(WaitConfig::new(
            Duration::from_millis(10),
            Duration::from_millis(500),
        ))
        .with_deleted(WaitConfig::new(
            Duration::from_millis(10),
            Duration::from_millis(500),
        ));
    let lifecycle = Lifecycle::new(plane.registries(), config);

    let name = common::unique_name("mk-e2e-registry");
    let handle = lifecycle
        .apply_or_reuse(&CreateRegistryRequest { name: name.clone() })
        .await?;
    assert_eq!(handle.kind, ResourceKind::SchemaRegistry);

    let snapshot = lifecycle.wait_until_ready(&handle.id).await?;
    assert_eq!(snapshot.status, RegistryStatus::Ready);

    lifecycle.delete_by_name_if_exists(&name).await?;
    lifecycle.wait_until_deleted(&handle.id).await?;
    Ok(())
}
