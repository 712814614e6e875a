use anyhow::Result;
use std::path::PathBuf;

use tsimport::indexer::{IndexerStatus, ScanStage};
use tsimport::{MatchMode, SymbolKind};

use crate::helpers::test_harness::TestHarness;

#[tokio::test]
async fn test_broken_file_does_not_stop_scan() -> Result<()> {
    let harness = TestHarness::new()?;
    for i in 0..9 {
        harness.create_test_file(
            &format!("src/module{}.ts", i),
            &format!("export class Service{} {{}}\n", i),
        )?;
    }
    harness.create_test_file("src/broken.ts", "export class {\n  method(: void\n")?;

    let engine = harness.engine()?;
    let report = engine.reindex(false).await?;

    assert_eq!(report.files_scanned, 9);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path, PathBuf::from("src/broken.ts"));
    assert_eq!(report.errors[0].stage, ScanStage::Parse);
    assert_eq!(engine.index().stats().symbols, 9);
    assert_eq!(engine.status(), IndexerStatus::Ready);

    Ok(())
}

#[tokio::test]
async fn test_reindex_round_trip_is_stable() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/a.ts", "export class A {}\nexport const a = 1;\n")?;
    harness.create_test_file("src/b/index.ts", "export interface B {}\n")?;
    harness.create_test_file("src/c.tsx", "export function C() { return <div />; }\n")?;

    let engine = harness.indexed_engine().await?;
    let first = engine.index().snapshot();

    engine.reindex(false).await?;
    let second = engine.index().snapshot();

    assert_eq!(first, second);
    assert_eq!(first.symbols.len(), 4);
    assert!(first.modules.contains("src/b"));
    assert!(engine.index().is_consistent());

    Ok(())
}

#[tokio::test]
async fn test_same_name_in_two_files_is_kept_twice() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/ui/button.ts", "export class Button {}\n")?;
    harness.create_test_file("src/legacy/button.ts", "export class Button {}\n")?;
    harness.create_test_file(
        "src/format.ts",
        "export function format(x: string): string;\nexport function format(x: number): string;\nexport function format(x: any) { return String(x); }\n",
    )?;

    let engine = harness.indexed_engine().await?;

    let buttons = engine.index().get_symbols("Button", false, MatchMode::Exact);
    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[0].module_path, PathBuf::from("src/legacy/button.ts"));

    let formats = engine.index().get_symbols("format", false, MatchMode::Exact);
    assert_eq!(formats.len(), 1);
    assert_eq!(formats[0].kind, SymbolKind::Function);

    Ok(())
}

#[tokio::test]
async fn test_excluded_and_ignored_files_are_not_indexed() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file(".gitignore", "generated/\n")?;
    harness.create_test_file("src/app.ts", "export const app = 1;\n")?;
    harness.create_test_file("generated/api.ts", "export const api = 1;\n")?;
    harness.create_test_file("dist/app.ts", "export const built = 1;\n")?;
    harness.create_test_file("node_modules/lib/index.ts", "export const lib = 1;\n")?;
    harness.create_test_file("src/notes.md", "export const no = 1;\n")?;

    let engine = harness.indexed_engine().await?;

    assert_eq!(engine.index().list_files(), vec![PathBuf::from("src/app.ts")]);

    Ok(())
}

#[tokio::test]
async fn test_scan_file_tracks_edits() -> Result<()> {
    let harness = TestHarness::new()?;
    let path = harness.create_test_file("src/model.ts", "export class User {}\n")?;
    let engine = harness.indexed_engine().await?;

    harness.create_test_file("src/model.ts", "export class Account {}\nexport class User {}\n")?;
    engine.scan_file(&path).await?;
    assert_eq!(engine.index().stats().symbols, 2);

    harness.create_test_file("src/model.ts", "export class {")?;
    engine.scan_file(&path).await?;
    assert!(engine.index().is_empty());
    assert_eq!(engine.status(), IndexerStatus::Ready);

    harness.create_test_file("src/model.ts", "export class Account {}\n")?;
    engine.scan_file(&path).await?;
    harness.remove_file("src/model.ts")?;
    engine.scan_file(&path).await?;
    assert!(engine.index().is_empty());
    assert!(engine.index().is_consistent());

    Ok(())
}

#[tokio::test]
async fn test_installed_package_declarations() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.config.scan.include = vec!["**/*.ts".to_string()];
    harness.config.scan.exclude = vec!["**/dist/**".to_string()];
    harness.create_test_file(
        "node_modules/@acme/ui/package.json",
        r#"{ "name": "@acme/ui", "types": "lib/index.d.ts" }"#,
    )?;
    harness.create_test_file(
        "node_modules/@acme/ui/lib/index.d.ts",
        "export declare class Dialog {}\n",
    )?;
    harness.create_test_file(
        "node_modules/@acme/ui/lib/forms/input.d.ts",
        "export declare function input(): void;\n",
    )?;
    harness.create_test_file(
        "types/vendor.d.ts",
        "declare module \"left-pad\" {\n  export function leftPad(s: string): string;\n}\n",
    )?;

    let engine = harness.indexed_engine().await?;
    let modules = engine.index().get_modules("", false, MatchMode::Any);

    assert!(modules.contains(&"@acme/ui".to_string()));
    assert!(modules.contains(&"@acme/ui/forms/input".to_string()));
    assert!(modules.contains(&"left-pad".to_string()));

    let left_pad = engine.index().get_module("left-pad").unwrap();
    assert_eq!(left_pad.symbols.len(), 1);
    assert_eq!(left_pad.symbols[0].name, "leftPad");

    Ok(())
}
