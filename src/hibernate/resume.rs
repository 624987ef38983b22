//! Resume address: filesystem UUID + swapfile extent offset, persisted as a
//! boot configuration fragment.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::hibernate::artifacts::ManagedFile;
use crate::hibernate::SetupError;
use crate::system::{self, executor};

/// Where the kernel must look for the hibernation image on next boot.
#[derive(Debug, Clone)]
pub struct ResumeTarget {
    /// UUID of the filesystem hosting the swapfile (not the file's own identity).
    pub uuid: String,
    /// MAJ:MIN of the backing block device, for /sys/power/resume injection.
    pub device: String,
    /// Physical offset of the swapfile's first extent, in filesystem blocks.
    pub offset: u64,
}

/// The offset moves whenever the file is reallocated, so this runs on every
/// prepare pass instead of trusting a cached value.
pub async fn compute() -> Result<ResumeTarget, SetupError> {
    let uuid = executor::run("findmnt", &["-no", "UUID", "--target", system::SWAPFILE_PATH])
        .await
        .map_err(|e| SetupError::ResolveUuid(e.to_string()))?
        .trim()
        .to_string();
    Uuid::parse_str(&uuid)
        .map_err(|e| SetupError::ResolveUuid(format!("findmnt returned '{}': {}", uuid, e)))?;

    let device = executor::run("findmnt", &["-no", "MAJ:MIN", "--target", system::SWAPFILE_PATH])
        .await
        .map_err(|e| SetupError::ResolveUuid(e.to_string()))?
        .trim()
        .to_string();

    let frag = executor::run("filefrag", &["-v", system::SWAPFILE_PATH])
        .await
        .map_err(|e| SetupError::ResolveOffset(e.to_string()))?;
    let offset = first_extent_offset(&frag)
        .ok_or_else(|| SetupError::ResolveOffset("no extent in filefrag output".to_string()))?;

    debug!("Resume target: UUID={} device={} offset={}", uuid, device, offset);
    Ok(ResumeTarget { uuid, device, offset })
}

/// Parse the physical offset of extent 0 out of `filefrag -v` output.
fn first_extent_offset(output: &str) -> Option<u64> {
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        if fields.next() != Some("0:") {
            continue;
        }
        // "   0:    0..  524287:   1060864..  1585151:  524288: ..."
        let physical = fields.nth(2)?;
        return physical
            .trim_end_matches(|c: char| c == '.' || c == ':')
            .parse()
            .ok();
    }
    None
}

pub fn fragment_contents(target: &ResumeTarget) -> String {
    system::GRUB_FRAGMENT_TEMPLATE
        .replace("{{UUID}}", &target.uuid)
        .replace("{{OFFSET}}", &target.offset.to_string())
}

pub fn fragment(target: &ResumeTarget) -> ManagedFile {
    ManagedFile::new(
        "boot resume fragment",
        system::GRUB_FRAGMENT_PATH,
        fragment_contents(target),
    )
}

/// Persist the fragment. Returns true when it changed on disk; a run with an
/// unchanged resume address leaves the file untouched.
pub async fn persist(target: &ResumeTarget) -> Result<bool, SetupError> {
    fragment(target)
        .write_if_changed()
        .await
        .map_err(|e| SetupError::PersistResume(e.to_string()))
}

/// Regenerate grub.cfg. The fragment is already in place, so a failure here
/// only delays the change until the next regeneration cycle.
pub async fn regenerate_boot_config() {
    match executor::run("update-grub", &[]).await {
        Ok(_) => info!("Boot configuration regenerated"),
        Err(e) => warn!(
            "Boot configuration regeneration failed ({}); run update-grub manually",
            e
        ),
    }
}

/// Read-only probe across the boot-config sources, most specific first:
/// our fragment, the main GRUB file, the kernel cmdline file.
pub async fn is_configured() -> bool {
    for path in [
        system::GRUB_FRAGMENT_PATH,
        system::GRUB_MAIN_PATH,
        system::KERNEL_CMDLINE_PATH,
    ] {
        if let Ok(contents) = tokio::fs::read_to_string(path).await {
            if contents.contains("resume=") {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ResumeTarget {
        ResumeTarget {
            uuid: "3c5b9cc1-9f24-4f76-a23c-6f0f2b62a001".to_string(),
            device: "259:8".to_string(),
            offset: 1060864,
        }
    }

    #[test]
    fn parses_first_extent() {
        let output = "\
File size of /home/swapfile is 9663676416 (2359296 blocks of 4096 bytes)
 ext:     logical_offset:        physical_offset: length:   expected: flags:
   0:        0..  524287:    1060864..   1585151: 524288:             unwritten
   1:   524288.. 2359295:    1703936..   3538943: 1835008:    1585152: last,unwritten,eof
/home/swapfile: 2 extents found
";
        assert_eq!(first_extent_offset(output), Some(1060864));
    }

    #[test]
    fn parses_single_block_extent() {
        let output = "\
 ext:     logical_offset:        physical_offset: length:   expected: flags:
   0:        0..       0:    7077888..   7077888:      1: last,eof
";
        assert_eq!(first_extent_offset(output), Some(7077888));
    }

    #[test]
    fn rejects_output_without_extents() {
        assert_eq!(first_extent_offset(""), None);
        assert_eq!(
            first_extent_offset("File size of /home/swapfile is 0 (0 blocks of 4096 bytes)\n"),
            None
        );
    }

    #[test]
    fn fragment_appends_to_base_cmdline() {
        let contents = fragment_contents(&target());
        assert!(contents.contains("$GRUB_CMDLINE_LINUX_DEFAULT"));
        assert!(contents.contains("resume=UUID=3c5b9cc1-9f24-4f76-a23c-6f0f2b62a001"));
        assert!(contents.contains("resume_offset=1060864"));
    }
}
