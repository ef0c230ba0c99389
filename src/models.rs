use std::fs;
use std::io;
use std::path::PathBuf;

use crate::constants::{MODEL_EXTENSION, MODEL_NAMESPACE};

/// Aliases for specific deep/shallow models and the winterreise folds. The
/// first match wins; names without an alias are used verbatim.
const ALIASES: &[(&str, &str)] = &[
    ("deepspec", "deepspec_k16"),
    ("shallowspec", "shallowspec_k4"),
    ("deepsquare", "deepsquare_k8"),
    ("winterreise", "ds_winterreise_v_fold0_HU33_OL06_QU98_SC06_TR99"),
    ("winterreise_v", "ds_winterreise_v_fold0_HU33_OL06_QU98_SC06_TR99"),
    ("winterreise_v_fold0", "ds_winterreise_v_fold0_HU33_OL06_QU98_SC06_TR99"),
    ("winterreise_v_fold1", "ds_winterreise_v_fold1_SC06_TR99_AL98_FI55_FI66"),
    ("winterreise_v_fold2", "ds_winterreise_v_fold2_FI55_FI66_FI80_HU33_OL06"),
    ("winterreise_s", "ds_winterreise_s_fold0_12_13_14_15_16_17_18_19_20_21_22_23_24"),
    ("winterreise_s_fold0", "ds_winterreise_s_fold0_12_13_14_15_16_17_18_19_20_21_22_23_24"),
    ("winterreise_s_fold1", "ds_winterreise_s_fold1_20_21_22_23_24_01_02_03_04_05_06_07_08"),
    ("winterreise_s_fold2", "ds_winterreise_s_fold2_04_05_06_07_08_09_10_11_12_13_14_15_16"),
    ("winterreise_n", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_01_02_03_FI80_HU33_04_05"),
    ("winterreise_n_fold00", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_01_02_03_FI80_HU33_04_05"),
    ("winterreise_n_fold01", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_04_05_06_FI80_HU33_07_08"),
    ("winterreise_n_fold02", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_07_08_09_FI80_HU33_10_11"),
    ("winterreise_n_fold03", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_10_11_12_FI80_HU33_13_14"),
    ("winterreise_n_fold04", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_13_14_15_FI80_HU33_16_17"),
    ("winterreise_n_fold05", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_16_17_18_FI80_HU33_19_20"),
    ("winterreise_n_fold06", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_19_20_21_FI80_HU33_22_23"),
    ("winterreise_n_fold07", "ds_winterreise_n_fold_NOT_AL98_FI55_FI66_22_23_24_FI80_HU33_01_02"),
    ("winterreise_n_fold08", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_01_02_03_QU98_SC06_04_05"),
    ("winterreise_n_fold09", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_04_05_06_QU98_SC06_07_08"),
    ("winterreise_n_fold10", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_07_08_09_QU98_SC06_10_11"),
    ("winterreise_n_fold11", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_10_11_12_QU98_SC06_13_14"),
    ("winterreise_n_fold12", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_13_14_15_QU98_SC06_16_17"),
    ("winterreise_n_fold13", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_16_17_18_QU98_SC06_19_20"),
    ("winterreise_n_fold14", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_19_20_21_QU98_SC06_22_23"),
    ("winterreise_n_fold15", "ds_winterreise_n_fold_NOT_FI80_HU33_OL06_22_23_24_QU98_SC06_01_02"),
    ("winterreise_n_fold16", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_01_02_03_AL98_FI55_04_05"),
    ("winterreise_n_fold17", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_04_05_06_AL98_FI55_07_08"),
    ("winterreise_n_fold18", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_07_08_09_AL98_FI55_10_11"),
    ("winterreise_n_fold19", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_10_11_12_AL98_FI55_13_14"),
    ("winterreise_n_fold20", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_13_14_15_AL98_FI55_16_17"),
    ("winterreise_n_fold21", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_16_17_18_AL98_FI55_19_20"),
    ("winterreise_n_fold22", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_19_20_21_AL98_FI55_22_23"),
    ("winterreise_n_fold23", "ds_winterreise_n_fold_NOT_QU98_SC06_TR99_22_23_24_AL98_FI55_01_02"),
];

/// Substitutes a model alias with its physical model id, or returns the name
/// unchanged when no alias matches.
pub fn resolve_model_name(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, physical)| *physical)
        .unwrap_or(name)
}

/// Normalizes a resolved model id into a resource locator by appending the
/// model extension and prefixing the resource namespace when absent.
pub fn to_model_resource(name: &str) -> String {
    let mut file = name.to_string();
    if !file.ends_with(MODEL_EXTENSION) {
        file.push_str(MODEL_EXTENSION);
    }
    if !file.starts_with(MODEL_NAMESPACE) {
        file = format!("{MODEL_NAMESPACE}{file}");
    }
    file
}

/// Hands out raw model bytes for a resource locator.
pub trait ResourceStore {
    /// Returns the bytes behind `locator`, or an error with
    /// `io::ErrorKind::NotFound` when no such resource exists.
    fn fetch(&self, locator: &str) -> io::Result<Vec<u8>>;
}

/// Resource store backed by a directory tree on disk; the locator is
/// interpreted relative to the root.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirectoryStore { root: root.into() }
    }
}

impl Default for DirectoryStore {
    fn default() -> Self {
        DirectoryStore::new(".")
    }
}

impl ResourceStore for DirectoryStore {
    fn fetch(&self, locator: &str) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(locator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_and_physical_name_resolve_to_the_same_resource() {
        assert_eq!(
            to_model_resource(resolve_model_name("deepspec")),
            to_model_resource(resolve_model_name("deepspec_k16"))
        );
    }

    #[test]
    fn unaliased_names_pass_through() {
        assert_eq!(resolve_model_name("deepspec_k16"), "deepspec_k16");
        assert_eq!(resolve_model_name("some_custom_model"), "some_custom_model");
    }

    #[test]
    fn winterreise_defaults_to_the_first_voice_fold() {
        assert_eq!(
            resolve_model_name("winterreise"),
            resolve_model_name("winterreise_v_fold0")
        );
    }

    #[test]
    fn resource_locator_gains_extension_and_namespace() {
        assert_eq!(to_model_resource("deepspec_k16"), "models/deepspec_k16.onnx");
        assert_eq!(to_model_resource("deepspec_k16.onnx"), "models/deepspec_k16.onnx");
        assert_eq!(
            to_model_resource("models/deepspec_k16.onnx"),
            "models/deepspec_k16.onnx"
        );
    }

    #[test]
    fn directory_store_reports_missing_resources() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let err = store.fetch("models/nope.onnx").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn directory_store_reads_existing_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models/tiny.onnx"), b"bytes").unwrap();

        let store = DirectoryStore::new(dir.path());
        assert_eq!(store.fetch("models/tiny.onnx").unwrap(), b"bytes");
    }
}
