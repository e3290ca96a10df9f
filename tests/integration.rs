use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use shredder::{
    extent, shred, shred_with_opts, shred_with_progress, ShredError, ShredOptions, ShredRequest,
};

/// Helper to create a temp dir holding a file with the given content
fn setup_test_file(data: &[u8]) -> Result<(TempDir, PathBuf)> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("target.bin");
    fs::write(&path, data)?;
    Ok((tmp, path))
}

fn request(path: &Path, iterations: u32, delete: bool, exact: bool) -> ShredRequest {
    ShredRequest::new(path, ShredOptions::new(iterations, delete, exact))
}

#[test]
fn test_shred_file_not_exist() -> Result<()> {
    let tmp = TempDir::new()?;
    let err = shred(tmp.path().join("file_that_doesnt_exist")).unwrap_err();
    assert!(matches!(err, ShredError::Open { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn test_shred_directory() -> Result<()> {
    let tmp = TempDir::new()?;
    let err = shred(tmp.path()).unwrap_err();
    assert!(matches!(err, ShredError::NotAFile { .. }), "got {err:?}");
    assert!(tmp.path().exists());
    Ok(())
}

#[test]
fn test_shred_defaults_delete() -> Result<()> {
    let (_tmp, path) = setup_test_file(b"sensitive")?;
    shred(&path)?;
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_shred_with_opts_delete() -> Result<()> {
    let (_tmp, path) = setup_test_file(b"test")?;
    shred_with_opts(&request(&path, 1, true, false))?;
    assert!(!path.exists(), "expected file to be deleted");
    Ok(())
}

#[test]
fn test_shred_with_opts_no_delete() -> Result<()> {
    let (_tmp, path) = setup_test_file(b"test")?;
    shred_with_opts(&request(&path, 1, false, false))?;
    assert!(path.exists(), "expected file to not be deleted");
    Ok(())
}

#[test]
fn test_shred_with_opts_exact() -> Result<()> {
    let data = b"test";
    let (_tmp, path) = setup_test_file(data)?;
    shred_with_opts(&request(&path, 1, false, true))?;

    let after = fs::read(&path)?;
    assert_eq!(after.len(), data.len());
    assert_ne!(&after[..], &data[..], "exact mode must still overwrite the content");
    Ok(())
}

#[test]
fn test_shred_with_opts_no_exact() -> Result<()> {
    let data = b"test";
    let (_tmp, path) = setup_test_file(data)?;
    let block_size = extent::block_size(&path)?;

    shred_with_opts(&request(&path, 1, false, false))?;

    // Expected size is the next block size multiple
    let expected = data.len() as u64 + block_size - 1 - (data.len() as u64 - 1) % block_size;
    assert_eq!(fs::metadata(&path)?.len(), expected);
    assert_eq!(expected, block_size);
    Ok(())
}

#[test]
fn test_shred_aligned_file_keeps_size() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("aligned.bin");
    fs::write(&path, b"")?;
    let block_size = extent::block_size(&path)?;
    fs::write(&path, vec![0x5a; block_size as usize * 2])?;

    shred_with_opts(&request(&path, 2, false, false))?;

    let after = fs::read(&path)?;
    assert_eq!(after.len() as u64, block_size * 2);
    assert!(after.iter().any(|&b| b != 0x5a));
    Ok(())
}

#[test]
fn test_shred_empty_file_stays_empty() -> Result<()> {
    let (_tmp, path) = setup_test_file(b"")?;
    shred_with_opts(&request(&path, 3, false, false))?;
    assert_eq!(fs::metadata(&path)?.len(), 0);
    Ok(())
}

#[test]
fn test_shred_with_opts_random_overwrite() -> Result<()> {
    let data = b"test".to_vec();
    let (_tmp, path) = setup_test_file(&data)?;

    // First run
    shred_with_opts(&request(&path, 1, false, false))?;
    let first = fs::read(&path)?;
    assert_ne!(data, first);
    assert_ne!(&first[..data.len()], &data[..]);

    // Second run uses a fresh seed
    shred_with_opts(&request(&path, 1, false, false))?;
    let second = fs::read(&path)?;
    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
    Ok(())
}

#[test]
fn test_shred_zero_iterations_leaves_content() -> Result<()> {
    let (_tmp, path) = setup_test_file(b"test")?;
    shred_with_opts(&request(&path, 0, false, true))?;
    assert_eq!(fs::read(&path)?, b"test");
    Ok(())
}

#[test]
fn test_progress_reports_every_pass() -> Result<()> {
    let (_tmp, path) = setup_test_file(b"test")?;
    let block_size = extent::block_size(&path)?;
    let data = vec![1u8; block_size as usize * 3 + 10];
    fs::write(&path, &data)?;

    let mut events = Vec::new();
    shred_with_progress(&request(&path, 2, false, true), |p| events.push(p))?;

    // Three full blocks plus a truncated one, twice.
    assert_eq!(events.len(), 8);
    assert!(events.iter().all(|p| p.passes == 2 && p.total == data.len() as u64));
    assert_eq!(events[3].pass, 1);
    assert_eq!(events[3].written, data.len() as u64);
    assert_eq!(events[4].pass, 2);
    assert_eq!(events[4].written, block_size);
    assert_eq!(events[7].written, data.len() as u64);
    Ok(())
}

#[test]
fn test_error_leaves_file_in_place() -> Result<()> {
    let tmp = TempDir::new()?;
    let err = shred_with_opts(&request(&tmp.path().join("gone"), 1, true, false)).unwrap_err();
    assert!(matches!(err, ShredError::Open { .. }));
    assert_eq!(err.path(), Some(tmp.path().join("gone").as_path()));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_shred_pipe() -> Result<()> {
    use std::ffi::CString;
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new()?;
    let pipe_path = tmp.path().join("pipe");
    let c_path = CString::new(pipe_path.as_os_str().as_bytes())?;
    // SAFETY: c_path is a valid NUL-terminated path.
    let ret = unsafe { libc::mkfifo(c_path.as_ptr(), 0o777) };
    assert_eq!(ret, 0, "mkfifo failed: {}", std::io::Error::last_os_error());

    // Keep a reader-writer open so the write-only open doesn't block.
    let mut holder = OpenOptions::new().read(true).write(true).open(&pipe_path)?;
    holder.write_all(b"test")?;

    // Seeking is illegal for pipes, sockets, or FIFOs (see lseek(2)).
    let err = shred(&pipe_path).unwrap_err();
    match err {
        ShredError::Seek { ref source, .. } => {
            assert_eq!(source.raw_os_error(), Some(libc::ESPIPE));
        }
        other => panic!("expected seek error, got {other:?}"),
    }
    assert!(pipe_path.exists(), "failed shred must not delete");

    drop(holder);
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_shred_block_device() -> Result<()> {
    use std::process::Command;

    // SAFETY: geteuid has no preconditions.
    if unsafe { libc::geteuid() } != 0 {
        eprintln!("skipping: root user is required");
        return Ok(());
    }
    let has_losetup = Command::new("losetup")
        .arg("--help")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !has_losetup {
        eprintln!("skipping: losetup tool is required");
        return Ok(());
    }

    let data: Vec<u8> = (0..4096).map(|i| b'a' + (i % 2) as u8).collect();
    let (_tmp, backing) = setup_test_file(&data)?;
    let out = Command::new("losetup")
        .args(["--find", "--show"])
        .arg(&backing)
        .output()?;
    if !out.status.success() {
        eprintln!("skipping: losetup could not attach a loop device");
        return Ok(());
    }
    let device = PathBuf::from(String::from_utf8(out.stdout)?.trim());

    let result = shred_with_opts(&request(&device, 1, false, false));
    let after = fs::read(&device);
    let _ = Command::new("losetup").arg("--detach").arg(&device).status();

    result?;
    let after = after?;
    assert_eq!(after.len(), data.len());
    assert_ne!(after, data);
    Ok(())
}
