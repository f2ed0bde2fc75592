//! Finding a reusable fixture container

use crate::error::{FixtureError, Result};
use crate::runtime::{ContainerHandle, ContainerRuntime, ListOptions};
use crate::services::ServiceSet;

/// Find a container created from `image` that declares exactly this service set
///
/// Returns `Ok(None)` when no container uses `image`. A container with the
/// image but another `CONFIG` entry is a conflict: only one fixture per image
/// is supported. Stopped containers are considered too.
pub fn find(
    runtime: &dyn ContainerRuntime,
    services: &ServiceSet,
    image: &str,
) -> Result<Option<ContainerHandle>> {
    let containers = runtime
        .list_containers(&ListOptions { all: true })
        .map_err(|e| FixtureError::runtime("list containers", e))?;

    let Some(summary) = containers.iter().find(|c| c.image == image) else {
        tracing::debug!("No container found for image {}", image);
        return Ok(None);
    };

    let detail = runtime
        .inspect_container(&summary.id)
        .map_err(|e| FixtureError::runtime(format!("inspect container {}", summary.id), e))?;

    let expected = services.config_env();
    let handle = ContainerHandle::from(detail);
    if handle.has_env(&expected) {
        tracing::debug!("Reusing container {} for {}", handle.id(), expected);
        return Ok(Some(handle));
    }

    tracing::warn!(
        "Container {} runs {} without {}; refusing to start a second fixture",
        summary.id,
        image,
        expected
    );
    Err(FixtureError::ConflictingFixture {
        container_id: summary.id.clone(),
        image: image.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::{Call, MockRuntime};
    use crate::runtime::{ContainerDetail, PortBindings};

    const IMAGE: &str = "localstack/localstack:0.9.1";

    fn container(id: &str, image: &str, env: &[&str]) -> ContainerDetail {
        ContainerDetail {
            id: id.to_string(),
            image: image.to_string(),
            env: env.iter().map(|e| e.to_string()).collect(),
            ports: PortBindings::new(),
            running: true,
        }
    }

    fn sqs() -> ServiceSet {
        ServiceSet::from_names(["sqs"]).unwrap()
    }

    #[test]
    fn test_find_matching_container() {
        let runtime = MockRuntime::new().with_container(container(
            "ls1",
            IMAGE,
            &["PATH=/bin", "CONFIG=sqs:4576"],
        ));

        let handle = find(&runtime, &sqs(), IMAGE).unwrap().unwrap();
        assert_eq!(handle.id(), "ls1");
        assert_eq!(runtime.count(|c| matches!(c, Call::Create(_))), 0);
    }

    #[test]
    fn test_find_conflicting_container() {
        let runtime =
            MockRuntime::new().with_container(container("ls1", IMAGE, &["NOTSERVICES=DUMMY"]));

        let err = find(&runtime, &sqs(), IMAGE).unwrap_err();
        assert!(matches!(
            err,
            FixtureError::ConflictingFixture { ref container_id, .. } if container_id == "ls1"
        ));
    }

    #[test]
    fn test_find_same_services_other_order_conflicts() {
        let runtime = MockRuntime::new().with_container(container(
            "ls1",
            IMAGE,
            &["CONFIG=sns:4575,sqs:4576"],
        ));
        let services = ServiceSet::from_names(["sqs", "sns"]).unwrap();

        let err = find(&runtime, &services, IMAGE).unwrap_err();
        assert!(matches!(err, FixtureError::ConflictingFixture { .. }));
    }

    #[test]
    fn test_find_unknown_image() {
        let runtime = MockRuntime::new().with_container(container(
            "other",
            "DummyImage:1.0.0",
            &["CONFIG=sqs:4576"],
        ));

        assert!(find(&runtime, &sqs(), IMAGE).unwrap().is_none());
        assert_eq!(runtime.count(|c| matches!(c, Call::Inspect(_))), 0);
    }

    #[test]
    fn test_find_no_containers() {
        let runtime = MockRuntime::new();
        assert!(find(&runtime, &sqs(), IMAGE).unwrap().is_none());
        assert_eq!(runtime.calls(), vec![Call::List]);
    }

    #[test]
    fn test_find_list_error() {
        let runtime = MockRuntime::new().fail_list("Dummy Error");

        let err = find(&runtime, &sqs(), IMAGE).unwrap_err();
        assert!(matches!(err, FixtureError::RuntimeUnavailable { .. }));
        assert_eq!(runtime.count(|c| matches!(c, Call::Inspect(_))), 0);
    }

    #[test]
    fn test_find_inspect_error() {
        let runtime = MockRuntime::new()
            .with_container(container("ls1", IMAGE, &["CONFIG=sqs:4576"]))
            .fail_inspect("Dummy Error");

        let err = find(&runtime, &sqs(), IMAGE).unwrap_err();
        assert!(matches!(err, FixtureError::RuntimeUnavailable { ref action, .. } if action.contains("ls1")));
    }

    #[test]
    fn test_find_skips_other_images_before_match() {
        let runtime = MockRuntime::new()
            .with_container(container("other", "postgres:16", &[]))
            .with_container(container("ls1", IMAGE, &["CONFIG=sqs:4576"]));

        let handle = find(&runtime, &sqs(), IMAGE).unwrap().unwrap();
        assert_eq!(handle.id(), "ls1");
        assert_eq!(
            runtime.calls(),
            vec![Call::List, Call::Inspect("ls1".to_string())]
        );
    }
}
