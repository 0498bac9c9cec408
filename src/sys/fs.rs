//! 文件系统接口
//! 生产实现：std::fs + statvfs / access(2) + glob

use chrono::{DateTime, Utc};
use nix::sys::statvfs::statvfs;
use nix::unistd::{access, AccessFlags};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::utils::{HealthError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpace {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl DiskSpace {
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes.saturating_sub(self.available_bytes);
        used as f64 * 100.0 / self.total_bytes as f64
    }
}

pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_writable(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn space(&self, path: &Path) -> Result<DiskSpace>;
    /// `dir` 下文件名匹配 `pattern` 的普通文件（不递归）
    fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>>;
    fn modified(&self, path: &Path) -> Result<DateTime<Utc>>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// 文件末尾最多 `max_lines` 行，非 UTF-8 字节按替换字符解码
    fn read_tail(&self, path: &Path, max_lines: usize) -> Result<Vec<String>>;
}

/// 取文本最后 `max_lines` 行
pub fn last_lines(text: &str, max_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

const TAIL_CHUNK: u64 = 8 * 1024;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_writable(&self, path: &Path) -> bool {
        access(path, AccessFlags::W_OK).is_ok()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn space(&self, path: &Path) -> Result<DiskSpace> {
        let st = statvfs(path)
            .map_err(|e| HealthError::System(format!("statvfs {}: {}", path.display(), e)))?;
        let frsize = st.fragment_size() as u64;
        Ok(DiskSpace {
            total_bytes: st.blocks() as u64 * frsize,
            available_bytes: st.blocks_available() as u64 * frsize,
        })
    }

    fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let full = dir.join(pattern);
        let full = full
            .to_str()
            .ok_or_else(|| HealthError::Parse(format!("non UTF-8 path: {}", full.display())))?;
        Ok(glob::glob(full)?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect())
    }

    fn modified(&self, path: &Path) -> Result<DateTime<Utc>> {
        let mtime = std::fs::metadata(path)?.modified()?;
        Ok(DateTime::<Utc>::from(mtime))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn read_tail(&self, path: &Path, max_lines: usize) -> Result<Vec<String>> {
        if max_lines == 0 {
            return Ok(Vec::new());
        }
        let mut file = File::open(path)?;
        let mut pos = file.metadata()?.len();
        let mut buf: Vec<u8> = Vec::new();

        // 从末尾按块向前读，直到换行符足够切出完整的 max_lines 行
        while pos > 0 && buf.iter().filter(|&&b| b == b'\n').count() <= max_lines {
            let step = TAIL_CHUNK.min(pos);
            pos -= step;
            file.seek(SeekFrom::Start(pos))?;
            let mut chunk = vec![0u8; step as usize];
            file.read_exact(&mut chunk)?;
            chunk.extend_from_slice(&buf);
            buf = chunk;
        }

        Ok(last_lines(&String::from_utf8_lossy(&buf), max_lines))
    }
}
