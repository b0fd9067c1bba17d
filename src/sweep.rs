use crate::error::{Result, SweepError};
use crate::scanner::{self, ScanOptions};
use crate::utils::format_bytes;
use crate::{info, verbose};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Yes/no oracle gating each deletion.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Interactive `[y/N]` prompt on stdin. Anything other than `y`/`Y` is a no.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        print!("{} [y/N] ", message);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}

/// Used by `--force`: every prompt answers yes.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _message: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Delete `paths` strictly in order, one confirmation at a time.
///
/// `on_delete` runs after a yes answer and before the file is removed, so
/// the caller can record the size about to be reclaimed. A removal failure
/// aborts the remaining queue; files already deleted stay deleted.
pub fn delete_sequentially<F>(
    paths: &[PathBuf],
    prompt: &mut dyn Confirm,
    mut on_delete: F,
) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    for path in paths {
        if prompt.confirm(&format!("Delete file {}?", path.display()))? {
            on_delete(path)?;
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// Run the whole sweep: filter, scan, and then offer every surviving
/// top-level file for deletion. Returns the reclaimed byte total.
pub fn run_sweep(
    target: &Path,
    options: &ScanOptions,
    list: bool,
    prompt: &mut dyn Confirm,
) -> Result<u64> {
    if !target.is_dir() {
        return Err(SweepError::NotADirectory(target.to_path_buf()));
    }
    let target = target.canonicalize()?;

    let mut candidates = scanner::list_dir(&target)?;
    if candidates.is_empty() {
        info!("📂 No files under {}", target.display());
        return Ok(0);
    }

    verbose!("Scanning {} entries under {}", candidates.len(), target.display());
    scanner::scan(&mut candidates, &target, options)?;

    // 只有顶层文件进删除队列, 子目录只用来找引用
    let queue: Vec<PathBuf> = candidates
        .iter()
        .map(|name| target.join(name))
        .filter(|path| path.is_file())
        .collect();

    if queue.is_empty() {
        info!("✅ Nothing unreferenced under {}", target.display());
        return Ok(0);
    }

    if list {
        info!("📋 Unreferenced files:");
        for path in &queue {
            info!("  {}", path.display());
        }
    }

    let mut reclaimed: u64 = 0;
    let outcome = delete_sequentially(&queue, prompt, |path| {
        reclaimed += fs::metadata(path)?.len();
        Ok(())
    });

    // 中途失败也要报告已释放的空间
    info!("💾 Reclaimed: {}", format_bytes(reclaimed));
    outcome?;

    Ok(reclaimed)
}
