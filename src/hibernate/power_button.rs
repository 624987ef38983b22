//! Hardware power-button override: alias the suspend unit to a sleep action.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use tracing::info;

use crate::system::{self, executor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerButtonMode {
    /// Power button hibernates immediately
    Hibernate,
    /// Power button suspends, escalating to hibernate after the delay
    SuspendThenHibernate,
}

impl PowerButtonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerButtonMode::Hibernate => "hibernate",
            PowerButtonMode::SuspendThenHibernate => "suspend-then-hibernate",
        }
    }

    pub fn target_unit(&self) -> &'static str {
        match self {
            PowerButtonMode::Hibernate => system::HIBERNATE_UNIT_PATH,
            PowerButtonMode::SuspendThenHibernate => system::SUSPEND_THEN_HIBERNATE_UNIT_PATH,
        }
    }
}

/// Replace whatever managed link is present with one pointing at `target`.
/// A regular file at the link path is not ours and is never clobbered.
async fn install_link(link: &Path, target: &Path) -> Result<()> {
    match tokio::fs::symlink_metadata(link).await {
        Ok(meta) if meta.file_type().is_symlink() => {
            tokio::fs::remove_file(link)
                .await
                .with_context(|| format!("Failed to remove existing link {}", link.display()))?;
        }
        Ok(_) => {
            return Err(anyhow!(
                "{} exists and is not a symlink; refusing to replace it",
                link.display()
            ));
        }
        Err(_) => {}
    }

    tokio::fs::symlink(target, link)
        .await
        .with_context(|| format!("Failed to link {} -> {}", link.display(), target.display()))?;
    Ok(())
}

async fn remove_link(link: &Path) -> Result<bool> {
    match tokio::fs::symlink_metadata(link).await {
        Ok(meta) if meta.file_type().is_symlink() => {
            tokio::fs::remove_file(link)
                .await
                .with_context(|| format!("Failed to remove {}", link.display()))?;
            Ok(true)
        }
        Ok(_) => Err(anyhow!(
            "{} is not a symlink; leaving it alone",
            link.display()
        )),
        Err(_) => Ok(false),
    }
}

pub async fn enable(mode: PowerButtonMode) -> Result<()> {
    install_link(
        Path::new(system::POWER_BUTTON_LINK),
        Path::new(mode.target_unit()),
    )
    .await?;
    executor::daemon_reload().await;

    info!("Power button bound to {}", mode.as_str());
    println!("✓ Power button bound to {}", mode.as_str());
    Ok(())
}

pub async fn disable() -> Result<()> {
    let removed = remove_link(Path::new(system::POWER_BUTTON_LINK)).await?;
    if removed {
        executor::daemon_reload().await;
        println!("✓ Power button restored to default suspend behavior");
    } else {
        println!("✓ Power button override was not installed");
    }
    Ok(())
}

/// Cleanup entry: drop the override link if one is installed.
pub async fn remove_override() -> Result<bool> {
    remove_link(Path::new(system::POWER_BUTTON_LINK)).await
}

/// Which mode the current link points at, if any.
pub async fn current() -> Option<PowerButtonMode> {
    let link = tokio::fs::read_link(system::POWER_BUTTON_LINK).await.ok()?;
    if link == Path::new(system::HIBERNATE_UNIT_PATH) {
        Some(PowerButtonMode::Hibernate)
    } else if link == Path::new(system::SUSPEND_THEN_HIBERNATE_UNIT_PATH) {
        Some(PowerButtonMode::SuspendThenHibernate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hibernado-test-pb-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn modes_map_to_their_units() {
        assert_eq!(
            PowerButtonMode::Hibernate.target_unit(),
            system::HIBERNATE_UNIT_PATH
        );
        assert_eq!(
            PowerButtonMode::SuspendThenHibernate.target_unit(),
            system::SUSPEND_THEN_HIBERNATE_UNIT_PATH
        );
    }

    #[tokio::test]
    async fn switching_modes_leaves_exactly_one_link() {
        let dir = temp_dir();
        let link = dir.join("systemd-suspend.service");
        let first = dir.join("systemd-hibernate.service");
        let second = dir.join("systemd-suspend-then-hibernate.service");
        tokio::fs::write(&first, "unit").await.unwrap();
        tokio::fs::write(&second, "unit").await.unwrap();

        install_link(&link, &first).await.unwrap();
        install_link(&link, &second).await.unwrap();

        let points_at = tokio::fs::read_link(&link).await.unwrap();
        assert_eq!(points_at, second);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn regular_files_are_never_clobbered() {
        let dir = temp_dir();
        let link = dir.join("systemd-suspend.service");
        tokio::fs::write(&link, "hand-written unit").await.unwrap();

        assert!(install_link(&link, &dir.join("target")).await.is_err());
        assert!(remove_link(&link).await.is_err());
        // Still intact.
        assert_eq!(
            tokio::fs::read_to_string(&link).await.unwrap(),
            "hand-written unit"
        );

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn removing_an_absent_link_is_a_no_op() {
        let dir = temp_dir();
        assert!(!remove_link(&dir.join("missing")).await.unwrap());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
