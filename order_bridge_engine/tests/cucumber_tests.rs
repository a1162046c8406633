mod cucumber;

use ::cucumber::{codegen::LocalBoxFuture, event::ScenarioFinished, gherkin, writer, World};
use futures_util::FutureExt;
use log::*;
use order_bridge_engine::test_utils::prepare_env::prepare_test_env;
use tokio::runtime::Runtime;

use crate::cucumber::BridgeWorld;

fn main() {
    prepare_test_env();
    let sys = Runtime::new().unwrap();
    sys.block_on(
        BridgeWorld::cucumber()
            .with_writer(writer::Libtest::or_basic())
            .after(|_f, _r, scenario, ev, w| post_test_hook(scenario, ev, w))
            .run("tests/features"),
    );
    info!("🚀️ Tests complete");
}

fn post_test_hook<'a>(
    scenario: &'a gherkin::Scenario,
    ev: &'a ScenarioFinished,
    world: Option<&'a mut BridgeWorld>,
) -> LocalBoxFuture<'a, ()> {
    let fut = async move {
        trace!("🚀️ After-scenario hook running for \"{}\"", scenario.name);
        match (ev, world) {
            (ScenarioFinished::StepFailed(_, _, _), Some(world)) => {
                error!("🚀️ Scenario \"{}\" failed. Notifications sent: {:?}", scenario.name, world.notifier.messages());
            },
            (ScenarioFinished::StepPassed, _) => debug!("🚀️ Scenario \"{}\" complete", scenario.name),
            _ => trace!("🚀️ Unhandled event: {ev:?}"),
        }
        trace!("🚀️ After-scenario hook complete");
    };
    fut.boxed_local()
}
