use anyhow::Result;

use tsimport::resolver::{ImportEditKind, ImportError};
use tsimport::MatchMode;

use crate::helpers::test_harness::TestHarness;

#[tokio::test]
async fn test_import_into_file_and_write_back() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/services/user.ts", "export class UserService {}\n")?;
    let document = harness.create_test_file(
        "src/app/main.ts",
        "// entry\n\nconst service = new UserService();\n",
    )?;

    let engine = harness.indexed_engine().await?;
    let symbol = engine
        .index()
        .get_symbols("UserService", false, MatchMode::Exact)
        .remove(0);

    let text = harness.read_file("src/app/main.ts")?;
    let edit = engine.import_symbol(&document, &text, &symbol)?;
    assert_eq!(edit.kind, ImportEditKind::Inserted);
    assert_eq!(edit.specifier, "../services/user");

    std::fs::write(&document, edit.apply(&text))?;
    assert_eq!(
        harness.read_file("src/app/main.ts")?,
        "// entry\n\nimport { UserService } from \"../services/user\";\n\nconst service = new UserService();\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_second_import_is_noop() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/m.ts", "export const B = 1;\n")?;
    let document = harness.create_test_file("src/x.ts", "B;\n")?;

    let engine = harness.indexed_engine().await?;
    let symbol = engine.index().get_symbols("B", false, MatchMode::Exact).remove(0);

    let text = harness.read_file("src/x.ts")?;
    let once = engine.import_symbol(&document, &text, &symbol)?.apply(&text);
    let again = engine.import_symbol(&document, &once, &symbol)?;

    assert!(again.is_noop());
    assert_eq!(again.kind, ImportEditKind::AlreadyImported);
    assert_eq!(again.apply(&once), once);

    Ok(())
}

#[tokio::test]
async fn test_names_from_one_module_are_merged() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("src/m.ts", "export class A {}\nexport class B {}\n")?;
    let document = harness.create_test_file("src/x.ts", "import { A } from \"./m\";\n")?;

    let engine = harness.indexed_engine().await?;
    let symbol = engine.index().get_symbols("B", false, MatchMode::Exact).remove(0);

    let text = harness.read_file("src/x.ts")?;
    let edit = engine.import_symbol(&document, &text, &symbol)?;

    assert_eq!(edit.kind, ImportEditKind::Merged);
    assert_eq!(edit.apply(&text), "import { A, B } from \"./m\";\n");

    Ok(())
}

#[tokio::test]
async fn test_symbol_is_not_imported_into_its_own_file() -> Result<()> {
    let harness = TestHarness::new()?;
    let document = harness.create_test_file("src/b.ts", "export class B {}\n")?;

    let engine = harness.indexed_engine().await?;
    let symbol = engine.index().get_symbols("B", false, MatchMode::Exact).remove(0);

    let result = engine.import_symbol(&document, "export class B {}\n", &symbol);
    assert!(matches!(result, Err(ImportError::SelfImport { .. })));

    Ok(())
}

#[tokio::test]
async fn test_package_symbol_uses_package_specifier() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.config.scan.exclude = vec![];
    harness.create_test_file(
        "node_modules/left-pad/package.json",
        r#"{ "name": "left-pad", "types": "index.d.ts" }"#,
    )?;
    harness.create_test_file(
        "node_modules/left-pad/index.d.ts",
        "export declare function leftPad(s: string): string;\n",
    )?;
    let document = harness.create_test_file("src/x.ts", "import { a } from \"./a\";\n")?;

    let engine = harness.indexed_engine().await?;
    let symbol = engine
        .index()
        .get_symbols("leftPad", false, MatchMode::Exact)
        .remove(0);

    let text = harness.read_file("src/x.ts")?;
    let edit = engine.import_symbol(&document, &text, &symbol)?;

    assert_eq!(edit.specifier, "left-pad");
    assert_eq!(
        edit.apply(&text),
        "import { a } from \"./a\";\nimport { leftPad } from \"left-pad\";\n"
    );

    Ok(())
}
