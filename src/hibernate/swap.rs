//! Swap backing store: size policy, allocation, format, activation.

use tracing::{debug, info};

use crate::hibernate::SetupError;
use crate::system::{executor, SWAPFILE_PATH, SWAP_MARGIN_BYTES, SWAP_PRIORITY};

/// mkswap writes this magic at the tail of the first page.
const SWAP_MAGIC: &[u8] = b"SWAPSPACE2";
const PAGE_SIZE: u64 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapfileState {
    Missing,
    TooSmall,
    Unformatted,
    Inactive,
    Active,
}

/// Installed physical RAM in bytes.
pub fn installed_ram() -> u64 {
    let mut sys = sysinfo::System::new();
    sys.refresh_memory();
    sys.total_memory()
}

/// Status floor: a backing store smaller than RAM cannot hold the image.
pub fn minimum_size(ram: u64) -> u64 {
    ram
}

/// Provisioning target: RAM plus headroom for image metadata.
pub fn required_size(ram: u64) -> u64 {
    ram + SWAP_MARGIN_BYTES
}

fn swap_entry_present(proc_swaps: &str, path: &str) -> bool {
    proc_swaps
        .lines()
        .skip(1) // header
        .any(|line| line.split_whitespace().next() == Some(path))
}

pub async fn is_active() -> bool {
    match tokio::fs::read_to_string("/proc/swaps").await {
        Ok(contents) => swap_entry_present(&contents, SWAPFILE_PATH),
        Err(_) => false,
    }
}

/// Check for the mkswap signature at the tail of the first page.
async fn has_swap_signature(path: &str) -> bool {
    use tokio::io::{AsyncReadExt, AsyncSeekExt};

    let Ok(mut file) = tokio::fs::File::open(path).await else {
        return false;
    };
    if file
        .seek(std::io::SeekFrom::Start(PAGE_SIZE - SWAP_MAGIC.len() as u64))
        .await
        .is_err()
    {
        return false;
    }

    let mut magic = [0u8; 10];
    match file.read_exact(&mut magic).await {
        Ok(_) => &magic[..] == SWAP_MAGIC,
        Err(_) => false,
    }
}

/// Read-only probe; every miss maps onto a status classification.
pub async fn probe() -> SwapfileState {
    let meta = match tokio::fs::metadata(SWAPFILE_PATH).await {
        Ok(meta) => meta,
        Err(_) => return SwapfileState::Missing,
    };

    if meta.len() < minimum_size(installed_ram()) {
        return SwapfileState::TooSmall;
    }
    if !has_swap_signature(SWAPFILE_PATH).await {
        return SwapfileState::Unformatted;
    }
    if !is_active().await {
        return SwapfileState::Inactive;
    }
    SwapfileState::Active
}

/// Converge the backing store: correctly sized, swap-formatted, activated.
/// Any failure here is fatal for the whole prepare pass.
pub async fn ensure() -> Result<(), SetupError> {
    let ram = installed_ram();
    let required = required_size(ram);

    let mut recreate = false;
    match tokio::fs::metadata(SWAPFILE_PATH).await {
        Ok(meta) => {
            if meta.len() < minimum_size(ram) {
                info!(
                    "Swapfile is {} bytes, below installed RAM ({} bytes) - recreating",
                    meta.len(),
                    ram
                );
                recreate = true;
            } else if !has_swap_signature(SWAPFILE_PATH).await {
                info!("Swapfile has no swap signature - recreating");
                recreate = true;
            }
        }
        Err(_) => recreate = true,
    }

    if recreate {
        if is_active().await {
            executor::run("swapoff", &[SWAPFILE_PATH])
                .await
                .map_err(|e| SetupError::Replace(e.to_string()))?;
        }
        match tokio::fs::remove_file(SWAPFILE_PATH).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(SetupError::Replace(e.to_string())),
        }
        create_swapfile(required).await?;
    } else {
        debug!("Swapfile already valid, skipping recreation");
    }

    if !is_active().await {
        executor::run("swapon", &["--priority", SWAP_PRIORITY, SWAPFILE_PATH])
            .await
            .map_err(|e| SetupError::Activate(e.to_string()))?;
        info!("Swap activated at priority {}", SWAP_PRIORITY);
    } else {
        debug!("Swap already active");
    }

    Ok(())
}

async fn create_swapfile(size: u64) -> Result<(), SetupError> {
    info!(
        "Allocating {} MiB swapfile at {}",
        size / (1024 * 1024),
        SWAPFILE_PATH
    );

    // 0600 before any payload lands in the file.
    {
        use std::os::unix::fs::OpenOptionsExt;
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(SWAPFILE_PATH)?;
    }

    // fallocate reserves physical blocks; a sparse file cannot back a
    // hibernation image.
    executor::run("fallocate", &["-l", &size.to_string(), SWAPFILE_PATH])
        .await
        .map_err(|e| SetupError::Allocate(e.to_string()))?;

    executor::run("mkswap", &[SWAPFILE_PATH])
        .await
        .map_err(|e| SetupError::Format(e.to_string()))?;

    Ok(())
}

/// Cleanup entry: deactivate if active. Ok(true) when swapoff actually ran.
pub async fn deactivate() -> anyhow::Result<bool> {
    if !is_active().await {
        return Ok(false);
    }
    executor::run("swapoff", &[SWAPFILE_PATH]).await?;
    Ok(true)
}

/// Cleanup entry: delete the backing file.
pub async fn delete_file() -> anyhow::Result<bool> {
    crate::hibernate::artifacts::remove_path(SWAPFILE_PATH).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hibernado-test-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn size_policy() {
        let ram = 8 * GIB;
        assert_eq!(required_size(ram), 9 * GIB);
        assert_eq!(minimum_size(ram), ram);

        // One byte short of RAM is below the floor.
        assert!(ram - 1 < minimum_size(ram));
        assert!(required_size(ram) >= minimum_size(ram));
    }

    #[test]
    fn proc_swaps_parsing() {
        let proc_swaps = "\
Filename                                Type            Size            Used            Priority
/dev/zram0                              partition       1048572         0               32767
/home/swapfile                          file            9437180         0               100
";
        assert!(swap_entry_present(proc_swaps, "/home/swapfile"));
        assert!(!swap_entry_present(proc_swaps, "/home/swapfile2"));
        assert!(!swap_entry_present("", "/home/swapfile"));
    }

    #[tokio::test]
    async fn swap_signature_detection() {
        let path = temp_path("swap-sig");
        let mut page = vec![0u8; PAGE_SIZE as usize];
        page[PAGE_SIZE as usize - SWAP_MAGIC.len()..].copy_from_slice(SWAP_MAGIC);
        tokio::fs::write(&path, &page).await.unwrap();
        assert!(has_swap_signature(path.to_str().unwrap()).await);

        tokio::fs::write(&path, vec![0u8; PAGE_SIZE as usize]).await.unwrap();
        assert!(!has_swap_signature(path.to_str().unwrap()).await);

        // Truncated file cannot carry the signature.
        tokio::fs::write(&path, b"short").await.unwrap();
        assert!(!has_swap_signature(path.to_str().unwrap()).await);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_has_no_signature() {
        let path = temp_path("no-such-swap");
        assert!(!has_swap_signature(path.to_str().unwrap()).await);
    }
}
