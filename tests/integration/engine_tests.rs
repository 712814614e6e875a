use anyhow::Result;
use std::sync::{Arc, Mutex};

use tsimport::config::NotificationLevel;
use tsimport::engine::{CompletionCategory, NotificationKind, Notifier};
use tsimport::indexer::IndexerStatus;
use tsimport::{CompletionSource, ImportEngine, MatchMode, QuickFixSource};

use crate::helpers::test_harness::TestHarness;

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    fn kinds(&self) -> Vec<NotificationKind> {
        self.messages.lock().unwrap().iter().map(|(k, _)| *k).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.messages.lock().unwrap().push((kind, message.to_string()));
    }
}

#[tokio::test]
async fn test_disabled_engine_answers_nothing() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.config.importer.enabled = false;
    harness.create_test_file("src/a.ts", "export class Alpha {}\n")?;

    let engine = harness.engine()?;
    assert_eq!(engine.status(), IndexerStatus::Disabled);

    let report = engine.reindex(false).await?;
    assert_eq!(report.files_scanned, 0);
    assert!(engine.index().is_empty());
    assert!(engine.query_symbols("Alpha", false, MatchMode::Any).is_empty());
    assert!(engine.query_modules("src", false, MatchMode::Any).is_empty());
    assert!(engine
        .suggest_imports_for_diagnostic(&harness.path().join("src/b.ts"), "Cannot find name 'Alpha'.")
        .is_empty());
    assert_eq!(engine.status(), IndexerStatus::Disabled);

    Ok(())
}

#[tokio::test]
async fn test_status_goes_ready_after_scan() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/a.ts", "export const a = 1;\n")?;

    let engine = harness.engine()?;
    let mut status = engine.subscribe_status();
    assert_eq!(*status.borrow(), IndexerStatus::Initializing);

    engine.reindex(false).await?;

    assert!(status.has_changed()?);
    assert_eq!(*status.borrow_and_update(), IndexerStatus::Ready);
    assert!(engine.status().is_ready());

    Ok(())
}

#[tokio::test]
async fn test_completion_queries() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file(
        "src/models/user.ts",
        "export class User {}\nexport interface UserProps {}\nexport function userName() {}\n",
    )?;
    harness.create_test_file("src/models/index.ts", "export type Id = string;\n")?;

    let engine = harness.indexed_engine().await?;

    let items = engine.query_symbols("user", true, MatchMode::Any);
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["User", "UserProps", "userName"]);
    assert_eq!(items[0].category, CompletionCategory::Class);
    assert_eq!(items[1].category, CompletionCategory::Interface);
    assert_eq!(items[2].category, CompletionCategory::Variable);
    assert_eq!(items[0].detail, "src/models/user.ts");

    let exact = engine.query_symbols("User", false, MatchMode::Exact);
    assert_eq!(exact.len(), 1);

    let modules = engine.query_modules("src/models", true, MatchMode::Any);
    let labels: Vec<&str> = modules.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["src/models", "src/models/user"]);
    assert!(modules.iter().all(|m| m.category == CompletionCategory::File));

    Ok(())
}

#[tokio::test]
async fn test_complete_at_cursor() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/models/user.ts", "export class User {}\n")?;

    let engine = harness.indexed_engine().await?;

    let line = "import { User } from \"src/mo";
    let items = engine.complete_at(line, line.chars().count());
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "src/models/user");

    let items = engine.complete_at("const u = new Us", 16);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "User");

    assert!(engine.complete_at("const u = ", 10).is_empty());

    Ok(())
}

#[tokio::test]
async fn test_quick_fix_for_missing_name() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/ui/button.ts", "export class Button {}\n")?;
    harness.create_test_file("src/legacy/button.ts", "export class Button {}\n")?;

    let engine = harness.indexed_engine().await?;
    let document = harness.path().join("src/legacy/button.ts");

    let fixes = engine.suggest_imports_for_diagnostic(&document, "Cannot find name 'Button'.");
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].title, "import { Button } from \"../ui/button\";");

    let document = harness.path().join("src/app.ts");
    let fixes = engine.suggest_imports_for_diagnostic(&document, "Cannot find name 'Button'.");
    let titles: Vec<&str> = fixes.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "import { Button } from \"./legacy/button\";",
            "import { Button } from \"./ui/button\";",
        ]
    );

    assert!(engine
        .suggest_imports_for_diagnostic(&document, "Property 'x' does not exist on type 'Button'.")
        .is_empty());

    Ok(())
}

#[tokio::test]
async fn test_notifications_follow_level() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.create_test_file("src/a.ts", "export const a = 1;\n")?;
    harness.create_test_file("src/broken.ts", "export class {")?;

    let notifier = Arc::new(RecordingNotifier::default());
    let engine = ImportEngine::with_notifier(harness.path(), harness.config.clone(), notifier.clone())?;
    engine.reindex(true).await?;
    assert_eq!(
        notifier.kinds(),
        vec![NotificationKind::Error, NotificationKind::Info]
    );

    harness.config.importer.notifications = NotificationLevel::Errors;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = ImportEngine::with_notifier(harness.path(), harness.config.clone(), notifier.clone())?;
    engine.reindex(true).await?;
    assert_eq!(notifier.kinds(), vec![NotificationKind::Error]);

    harness.config.importer.notifications = NotificationLevel::Off;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = ImportEngine::with_notifier(harness.path(), harness.config.clone(), notifier.clone())?;
    engine.reindex(true).await?;
    assert!(notifier.kinds().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_silent_reindex_only_reports_failures() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/a.ts", "export const a = 1;\n")?;

    let notifier = Arc::new(RecordingNotifier::default());
    let engine = ImportEngine::with_notifier(harness.path(), harness.config.clone(), notifier.clone())?;
    engine.reindex(false).await?;
    assert!(notifier.kinds().is_empty());

    harness.create_test_file("src/broken.ts", "export class {")?;
    engine.reindex(false).await?;
    assert_eq!(notifier.kinds(), vec![NotificationKind::Error]);

    engine.reindex(true).await?;
    assert_eq!(
        notifier.kinds(),
        vec![
            NotificationKind::Error,
            NotificationKind::Error,
            NotificationKind::Info
        ]
    );

    Ok(())
}
