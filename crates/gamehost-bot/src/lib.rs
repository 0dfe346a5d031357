pub mod features;
pub mod shared;

use std::sync::Arc;

use features::address_watch::controller::AddressWatchController;
use features::address_watch::service::{AddressWatchService, WatchPolicy};
use features::command_routing::controller::CommandRoutingController;
use features::command_routing::repo::ChatSink;
use features::command_routing::service::CommandRouter;
use features::compute_directory::repo::ComputeApi;
use features::compute_directory::service::DirectoryService;
use features::instance_lifecycle::controller::LifecycleController;
use features::instance_lifecycle::service::LifecycleService;

/// Wire the feature layers around the two external collaborators.
pub fn assemble(
    api: Arc<dyn ComputeApi>,
    chat: Arc<dyn ChatSink>,
    router: CommandRouter,
    policy: WatchPolicy,
) -> Arc<CommandRoutingController> {
    let directory = Arc::new(DirectoryService::new(api));
    let watch_service = Arc::new(AddressWatchService::new(
        directory.clone(),
        chat.clone(),
        policy,
    ));
    let watches = Arc::new(AddressWatchController::new(watch_service));
    let lifecycle = Arc::new(LifecycleController::new(
        Arc::new(LifecycleService::new(directory)),
        watches,
        chat,
    ));

    Arc::new(CommandRoutingController::new(router, lifecycle))
}
