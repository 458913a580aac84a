use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Sorts two values and rejects everything a correct push_swap rejects for inputs in
/// the default range.
pub const STRICT_PAIR_SORTER: &str = r#"#!/bin/sh
[ "$#" -eq 2 ] || { echo Error >&2; exit 1; }
for v in "$1" "$2"; do
  case "$v" in
    ''|-|*[!0-9-]*|?*-*) echo Error >&2; exit 1 ;;
  esac
  [ "${#v}" -le 3 ] || { echo Error >&2; exit 1; }
done
[ "$1" -eq "$2" ] && { echo Error >&2; exit 1; }
if [ "$1" -gt "$2" ]; then echo sa; fi
exit 0
"#;

/// Sorts two values without validating anything.
pub const LENIENT_PAIR_SORTER: &str = r#"#!/bin/sh
if [ "$1" -gt "$2" ] 2>/dev/null; then echo sa; fi
exit 0
"#;

/// Expects both values in a single argument.
pub const JOINED_PAIR_SORTER: &str = r#"#!/bin/sh
set -- $1
if [ "$1" -gt "$2" ]; then echo sa; fi
exit 0
"#;

pub const ALWAYS_ERROR: &str = "#!/bin/sh\necho Error >&2\nexit 1\n";

pub const GARBAGE_OUTPUT: &str = "#!/bin/sh\necho sa\necho xx\n";

pub const HANGS: &str = "#!/bin/sh\nsleep 5\necho done\n";

/// Temporary directory holding executable subject scripts.
pub struct ScriptDir {
    pub dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Write `body` as an executable script and return its absolute path.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, body).expect("Failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod script");
        path
    }
}
