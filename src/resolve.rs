//! Path resolution: source kind detection, test-path mapping, import specifiers.
//!
//! A relative source path deterministically maps to:
//! - a generated test-file path under the test root, and
//! - an import specifier recognized by the build tooling's alias config.
//!
//! The test file keeps the full source filename and appends `.test.ts`
//! (`components/Foo.vue` -> `test/components/Foo.vue.test.ts`), mirroring the
//! layout the runner's include filters expect.

use std::path::{Path, PathBuf};

/// Recognized source-file extensions, longest first so stripping matches
/// greedily (`.tsx` before `.ts`).
pub const SOURCE_EXTENSIONS: &[&str] = &[".tsx", ".jsx", ".vue", ".ts", ".js"];

/// Prefix identifying UI component sources within the source root.
pub const COMPONENTS_PREFIX: &str = "components/";

/// Import alias for component modules.
pub const COMPONENTS_ALIAS: &str = "/@/components/";

/// Generic import alias for everything else under the source root.
pub const GENERIC_ALIAS: &str = "/@/src/";

/// Kind of source file, selecting the scaffold template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Vue single-file component (.vue).
    Vue,
    /// TypeScript module (.ts, .tsx).
    TypeScript,
    /// Type-definition module (types.ts / typing.ts).
    TypeDefs,
    /// JavaScript module (.js, .jsx).
    JavaScript,
}

impl SourceKind {
    /// Classify a relative source path, or None if the extension is not one
    /// of the recognized source extensions.
    pub fn from_path(path: &str) -> Option<Self> {
        let file_name = Path::new(path).file_name()?.to_str()?;
        if path.ends_with(".vue") {
            Some(SourceKind::Vue)
        } else if path.ends_with(".ts") || path.ends_with(".tsx") {
            if file_name == "types.ts" || file_name == "typing.ts" {
                Some(SourceKind::TypeDefs)
            } else {
                Some(SourceKind::TypeScript)
            }
        } else if path.ends_with(".js") || path.ends_with(".jsx") {
            Some(SourceKind::JavaScript)
        } else {
            None
        }
    }
}

/// Check whether a path names a recognized source file.
pub fn is_source_file(path: &str) -> bool {
    SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// A resolved source entry: where the test goes and how the module imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Relative source path as given.
    pub source_path: String,
    /// Test-file path relative to the project root.
    pub test_path: PathBuf,
    /// Import specifier for the generated test.
    pub import_specifier: String,
    /// Module or component name (file stem without the source extension).
    pub module_name: String,
    /// Template kind for this source.
    pub kind: SourceKind,
}

/// Resolve a relative source path into its test path and import specifier.
///
/// Returns None when the path does not end in a recognized source extension;
/// such entries are not source files and are skipped by the batch driver.
///
/// The import specifier strips the longest matching known extension. Paths
/// rooted under `components/` lose that prefix and gain the components alias;
/// all other paths gain the generic alias.
pub fn resolve(source_path: &str, test_root: &str) -> Option<ResolvedSource> {
    let kind = SourceKind::from_path(source_path)?;

    let stripped = strip_source_extension(source_path);
    let import_specifier = match stripped.strip_prefix(COMPONENTS_PREFIX) {
        Some(rest) => format!("{}{}", COMPONENTS_ALIAS, rest),
        None => format!("{}{}", GENERIC_ALIAS, stripped),
    };

    let file_name = Path::new(source_path).file_name()?.to_str()?;
    let module_name = strip_source_extension(file_name).to_string();

    let test_path = PathBuf::from(test_root).join(format!("{}.test.ts", source_path));

    Some(ResolvedSource {
        source_path: source_path.to_string(),
        test_path,
        import_specifier,
        module_name,
        kind,
    })
}

/// Map a generated test path back to its subject source path.
///
/// Inverse of [`resolve`]: swaps the leading test root for the source root
/// and strips the `.test.ts` suffix, leaving the original source extension
/// (`test/components/Foo.vue.test.ts` -> `components/Foo.vue`). Returns None
/// when the path is not rooted under the test root or lacks the suffix.
pub fn source_for_test(test_path: &str, test_root: &str) -> Option<String> {
    let rel = test_path.strip_prefix(test_root)?.strip_prefix('/')?;
    let source = rel.strip_suffix(".test.ts")?;
    if is_source_file(source) {
        Some(source.to_string())
    } else {
        None
    }
}

/// Strip the longest matching known source extension from a path.
fn strip_source_extension(path: &str) -> &str {
    for ext in SOURCE_EXTENSIONS {
        if let Some(stripped) = path.strip_suffix(ext) {
            return stripped;
        }
    }
    path
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod source_kind_tests {
        use super::*;

        #[test]
        fn vue_files_classify_as_vue() {
            assert_eq!(
                SourceKind::from_path("components/Foo.vue"),
                Some(SourceKind::Vue)
            );
        }

        #[test]
        fn ts_files_classify_as_typescript() {
            assert_eq!(
                SourceKind::from_path("hooks/useFoo.ts"),
                Some(SourceKind::TypeScript)
            );
            assert_eq!(
                SourceKind::from_path("views/App.tsx"),
                Some(SourceKind::TypeScript)
            );
        }

        #[test]
        fn type_definition_files_classify_as_typedefs() {
            assert_eq!(
                SourceKind::from_path("components/Table/types.ts"),
                Some(SourceKind::TypeDefs)
            );
            assert_eq!(
                SourceKind::from_path("hooks/typing.ts"),
                Some(SourceKind::TypeDefs)
            );
        }

        #[test]
        fn js_files_classify_as_javascript() {
            assert_eq!(
                SourceKind::from_path("logics/legacy.js"),
                Some(SourceKind::JavaScript)
            );
        }

        #[test]
        fn unrecognized_extensions_are_not_source() {
            assert_eq!(SourceKind::from_path("assets/logo.svg"), None);
            assert_eq!(SourceKind::from_path("README.md"), None);
            assert!(!is_source_file("styles/main.less"));
        }
    }

    mod import_specifier_tests {
        use super::*;

        #[test]
        fn components_prefix_is_stripped_and_aliased() {
            let resolved = resolve("components/Basic/BasicHelp.vue", "test").unwrap();
            assert_eq!(resolved.import_specifier, "/@/components/Basic/BasicHelp");
        }

        #[test]
        fn non_component_paths_get_generic_alias() {
            let resolved = resolve("hooks/web/useI18n.ts", "test").unwrap();
            assert_eq!(resolved.import_specifier, "/@/src/hooks/web/useI18n");
        }

        #[test]
        fn longest_extension_wins() {
            // .tsx must strip fully rather than leaving a trailing "x"
            let resolved = resolve("components/Table/helper.tsx", "test").unwrap();
            assert_eq!(resolved.import_specifier, "/@/components/Table/helper");
        }

        #[test]
        fn module_name_is_stem_without_extension() {
            let resolved = resolve("components/CropperAvatar.vue", "test").unwrap();
            assert_eq!(resolved.module_name, "CropperAvatar");
        }
    }

    mod test_path_tests {
        use super::*;

        #[test]
        fn test_path_mirrors_source_with_suffix() {
            let resolved = resolve("components/Foo.vue", "test").unwrap();
            assert_eq!(
                resolved.test_path,
                PathBuf::from("test/components/Foo.vue.test.ts")
            );
        }

        #[test]
        fn ts_sources_also_keep_full_name() {
            let resolved = resolve("hooks/web/useI18n.ts", "test").unwrap();
            assert_eq!(
                resolved.test_path,
                PathBuf::from("test/hooks/web/useI18n.ts.test.ts")
            );
        }

        #[test]
        fn non_source_paths_resolve_to_none() {
            assert!(resolve("assets/logo.svg", "test").is_none());
            assert!(resolve("components", "test").is_none());
        }
    }

    mod source_for_test_tests {
        use super::*;

        #[test]
        fn inverts_the_test_path_mapping() {
            assert_eq!(
                source_for_test("test/components/Foo.vue.test.ts", "test").as_deref(),
                Some("components/Foo.vue")
            );
            assert_eq!(
                source_for_test("test/hooks/web/useI18n.ts.test.ts", "test").as_deref(),
                Some("hooks/web/useI18n.ts")
            );
        }

        #[test]
        fn round_trips_with_resolve() {
            let resolved = resolve("components/Table/helper.tsx", "test").unwrap();
            let test_path = resolved.test_path.to_string_lossy().to_string();
            assert_eq!(
                source_for_test(&test_path, "test").as_deref(),
                Some("components/Table/helper.tsx")
            );
        }

        #[test]
        fn rejects_paths_outside_the_test_root() {
            assert!(source_for_test("src/components/Foo.vue", "test").is_none());
        }

        #[test]
        fn rejects_paths_without_the_test_suffix() {
            assert!(source_for_test("test/setup.ts", "test").is_none());
        }
    }
}
