use std::fs;
use std::path::{Path, PathBuf};

/// A usable JVM: a display label for the picker and the home directory to
/// hand to the build as `JAVA_HOME`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaInstall {
    pub display: String,
    pub path: PathBuf,
}

impl JavaInstall {
    pub fn new(display: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            display: display.into(),
            path: path.into(),
        }
    }
}

/// Decodes the flat alternating `[display, path, display, path, ...]` list
/// the enumeration produces. An odd trailing element has no path and is
/// dropped.
pub fn from_flat_list(flat: Vec<String>) -> Vec<JavaInstall> {
    let mut installs = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let Some(display) = iter.next() {
        let Some(path) = iter.next() else {
            break;
        };
        installs.push(JavaInstall::new(display, path));
    }
    installs
}

fn has_java_binary(home: &Path) -> bool {
    let bin = home.join("bin");
    bin.join("java").is_file() || bin.join("java.exe").is_file()
}

fn push_flat_entry(flat: &mut Vec<String>, display: String, home: &Path) {
    // Paths sit at the odd positions of the flat list.
    if flat
        .iter()
        .skip(1)
        .step_by(2)
        .any(|path| Path::new(path) == home)
    {
        return;
    }
    flat.push(display);
    flat.push(home.display().to_string());
}

fn scan_jvm_dir(flat: &mut Vec<String>, base: &Path, nest_contents_home: bool) {
    let Ok(entries) = fs::read_dir(base) else {
        return;
    };
    let mut found: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let home = if nest_contents_home {
            entry.path().join("Contents").join("Home")
        } else {
            entry.path()
        };
        if has_java_binary(&home) {
            found.push((name, home));
        }
    }
    found.sort();
    for (name, home) in found {
        push_flat_entry(flat, name, &home);
    }
}

/// Probes the conventional JVM install locations for this platform and
/// returns the flat alternating `[display, path, ...]` list, `JAVA_HOME`
/// first when it points at a real install.
fn probe_flat_list() -> Vec<String> {
    let mut flat = Vec::new();
    if let Some(java_home) = std::env::var_os("JAVA_HOME") {
        let home = PathBuf::from(java_home);
        if has_java_binary(&home) {
            push_flat_entry(&mut flat, "JAVA_HOME".to_string(), &home);
        }
    }
    scan_jvm_dir(&mut flat, Path::new("/usr/lib/jvm"), false);
    scan_jvm_dir(
        &mut flat,
        Path::new("/Library/Java/JavaVirtualMachines"),
        true,
    );
    if let Some(program_files) = std::env::var_os("ProgramFiles") {
        scan_jvm_dir(&mut flat, &PathBuf::from(program_files).join("Java"), false);
    }
    flat
}

/// Lists the JVM installs offered by the picker, in picker order; the first
/// entry is the default selection.
pub fn detect_java_installs() -> Vec<JavaInstall> {
    from_flat_list(probe_flat_list())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_list_pairs_up_display_and_path() {
        let installs = from_flat_list(vec![
            "OpenJDK 21".to_string(),
            "/usr/lib/jvm/java-21-openjdk".to_string(),
            "Temurin 17".to_string(),
            "/usr/lib/jvm/temurin-17".to_string(),
        ]);
        assert_eq!(installs.len(), 2);
        assert_eq!(installs[0].display, "OpenJDK 21");
        assert_eq!(
            installs[1].path,
            PathBuf::from("/usr/lib/jvm/temurin-17")
        );
    }

    #[test]
    fn odd_trailing_element_is_dropped() {
        let installs = from_flat_list(vec![
            "OpenJDK 21".to_string(),
            "/usr/lib/jvm/java-21-openjdk".to_string(),
            "dangling".to_string(),
        ]);
        assert_eq!(installs.len(), 1);
        assert_eq!(installs[0].display, "OpenJDK 21");
    }

    #[test]
    fn empty_flat_list_yields_no_installs() {
        assert!(from_flat_list(Vec::new()).is_empty());
    }

    #[test]
    fn jvm_dir_scan_emits_decodable_flat_pairs() {
        let unique = format!(
            "matchview-java-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before epoch")
                .as_nanos()
        );
        let base = std::env::temp_dir().join(unique);
        let good = base.join("java-21-openjdk");
        fs::create_dir_all(good.join("bin")).expect("mkdir");
        fs::write(good.join("bin").join("java"), "").expect("write");
        fs::create_dir_all(base.join("not-a-jvm")).expect("mkdir");

        let mut flat = Vec::new();
        scan_jvm_dir(&mut flat, &base, false);
        assert_eq!(flat.len(), 2);

        let installs = from_flat_list(flat);
        assert_eq!(installs.len(), 1);
        assert_eq!(installs[0].display, "java-21-openjdk");
        assert_eq!(installs[0].path, good);
        fs::remove_dir_all(&base).expect("cleanup");
    }

    #[test]
    fn repeated_scan_of_the_same_dir_does_not_duplicate() {
        let unique = format!(
            "matchview-java-dup-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before epoch")
                .as_nanos()
        );
        let base = std::env::temp_dir().join(unique);
        let good = base.join("temurin-17");
        fs::create_dir_all(good.join("bin")).expect("mkdir");
        fs::write(good.join("bin").join("java"), "").expect("write");

        let mut flat = Vec::new();
        scan_jvm_dir(&mut flat, &base, false);
        scan_jvm_dir(&mut flat, &base, false);
        let installs = from_flat_list(flat);
        assert_eq!(installs.len(), 1);
        fs::remove_dir_all(&base).expect("cleanup");
    }
}
