//! Given steps for learning-cycle BDD scenarios.

use super::{when::plan_workload, world::LearningCycleWorld};
use rstest_bdd_macros::given;
use studycycle::task::domain::UserId;

#[given("a learner")]
fn a_learner(world: &mut LearningCycleWorld) {
    world.learner = Some(UserId::new());
}

#[given(r#"the learner has planned "{title}" with {total:u32} pages at {daily:u32} per day"#)]
fn learner_has_planned(
    world: &mut LearningCycleWorld,
    title: String,
    total: u32,
    daily: u32,
) -> Result<(), eyre::Report> {
    plan_workload(world, title, total, daily)
}
