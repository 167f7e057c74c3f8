//! Wheelhouse fixtures

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use avail_wheels::parser::ArtifactRecord;
use avail_wheels::scanner::{DirectoryWheelSource, build_corpus};

/// `<stack>/<arch>` directories and the wheels they hold
pub const TEST_WHEELHOUSE: &[(&str, &[&str])] = &[
    (
        "generic/generic",
        &[
            "pydicom-1.1.0-1-py2.py3-none-any.whl",
            "pydicom-0.9.9-py3-none-any.whl",
            "shiboken2-5.15.0-5.15.0-cp35.cp36.cp37.cp38-abi3-linux_x86_64.whl",
            "shiboken2-5.15.0-5.15.0-cp27-cp27mu-linux_x86_64.whl",
            "extension_helpers-0.0.0-py3-none-any.whl",
            "path.py-12.5.0-py3-none-any.whl",
        ],
    ),
    (
        "gentoo/avx2",
        &[
            "tensorflow_gpu-1.8.0+computecanada-cp27-cp27mu-linux_x86_64.whl",
            "tensorflow_gpu-1.8.0+computecanada-cp35-cp35m-linux_x86_64.whl",
            "tensorflow_gpu-1.8.0+computecanada-cp36-cp36m-linux_x86_64.whl",
        ],
    ),
    (
        "gentoo/avx512",
        &["numpy-1.23.0-cp39-cp39-linux_x86_64.whl"],
    ),
    (
        "gentoo/generic",
        &[
            "scipy-1.1.0-cp27-cp27mu-linux_x86_64.whl",
            "scipy-1.1.0-cp35-cp35m-linux_x86_64.whl",
            "scipy-1.1.0-cp36-cp36m-linux_x86_64.whl",
            "scipy-1.1.0-cp37-cp37m-linux_x86_64.whl",
            "scipy-1.7.0-cp35-cp35m-linux_x86_64.whl",
            "scipy-1.7.0-cp36-cp36m-linux_x86_64.whl",
            "scipy-1.7.0-cp37-cp37m-linux_x86_64.whl",
            "numpy-1.22.2-cp39-cp39-linux_x86_64.whl",
            "not-a-wheel.whl",
            "README.md",
        ],
    ),
];

/// Create the test wheelhouse in a temporary directory
pub fn create_test_wheelhouse() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (directory, filenames) in TEST_WHEELHOUSE {
        let directory = temp_dir.path().join(directory);
        fs::create_dir_all(&directory).unwrap();
        for filename in *filenames {
            fs::write(directory.join(filename), b"").unwrap();
        }
    }
    temp_dir
}

/// Scan the given `<stack>/<arch>` directories of a wheelhouse
pub fn load_corpus(wheelhouse: &Path, directories: &[&str]) -> Vec<ArtifactRecord> {
    let search_paths: Vec<PathBuf> = directories
        .iter()
        .map(|directory| wheelhouse.join(directory))
        .collect();
    build_corpus(&DirectoryWheelSource::new(search_paths))
        .unwrap()
        .records
}

pub fn write_file(directory: &Path, name: &str, content: &str) -> PathBuf {
    let path = directory.join(name);
    fs::write(&path, content).unwrap();
    path
}
