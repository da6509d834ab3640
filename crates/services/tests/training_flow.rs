use services::{AppServices, Clock, SessionHolder};
use training_core::model::{AttemptResult, BadgeId, ModuleId};
use training_core::progression::{CompletionPolicy, ModuleStatus, TrainingState};
use training_core::time::fixed_now;

const MODULES: [&str; 4] = ["module1", "module2", "module3", "module4"];

#[tokio::test]
async fn regular_user_reaches_certification() {
    let app = AppServices::seeded(Clock::fixed(fixed_now()), CompletionPolicy::Strict).unwrap();
    let mut session = SessionHolder::new();
    app.sign_in()
        .sign_in(&mut session, "user@gennova.com")
        .await
        .unwrap();

    let progress = app.progress();
    for (module, points) in MODULES.iter().zip([125, 150, 135, 175]) {
        let id = ModuleId::new(*module);
        let learner = session.current_learner().unwrap();
        assert_ne!(progress.module_status(learner, &id), ModuleStatus::Locked);
        progress.finish_module(&mut session, &id, points).unwrap();
    }

    let learner = session.current_learner().unwrap();
    let record = learner.progress();
    assert_eq!(record.total_modules_completed(), 4);
    assert_eq!(record.total_points(), 585);
    assert!(record.has_badge(&BadgeId::new("certified-aseptic-handler")));
    assert_eq!(record.module(&ModuleId::new("module1")).unwrap().attempts, 3);

    let dashboard = app.dashboard().dashboard(learner);
    assert_eq!(dashboard.progress_percentage, 100);
    assert_eq!(dashboard.state, TrainingState::Completed);
    assert_eq!(dashboard.timeline.len(), 4);
}

#[tokio::test]
async fn sign_out_discards_unsaved_progress() {
    let app = AppServices::seeded(Clock::fixed(fixed_now()), CompletionPolicy::Lenient).unwrap();
    let mut session = SessionHolder::new();
    let sign_in = app.sign_in();
    sign_in.sign_in(&mut session, "user@gennova.com").await.unwrap();

    app.progress()
        .complete_module(
            &mut session,
            &ModuleId::new("module2"),
            AttemptResult::completed(1, 150, fixed_now()),
        )
        .unwrap();
    assert_eq!(
        session.current_learner().unwrap().progress().total_points(),
        245
    );

    session.sign_out();
    let learner = sign_in.sign_in(&mut session, "user@gennova.com").await.unwrap();
    assert_eq!(learner.progress().total_points(), 95);
}

#[tokio::test]
async fn dashboard_serializes_for_the_presentation_layer() {
    let app = AppServices::seeded(Clock::fixed(fixed_now()), CompletionPolicy::Strict).unwrap();
    let mut session = SessionHolder::new();
    let learner = app
        .sign_in()
        .sign_in(&mut session, "admin@gennova.com")
        .await
        .unwrap();

    let json = serde_json::to_value(app.dashboard().dashboard(learner)).unwrap();
    assert_eq!(json["progress_percentage"], 100);
    assert_eq!(json["modules"][0]["status"], "completed");
    assert_eq!(json["state"], "completed");
}
