use std::ffi::CString;
use std::io;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use libc::statfs;

use crate::cgroupfs::CgroupfsError;

/// Magic number of the filesystem of a unified resource-control hierarchy
pub const CGROUP2_SUPER_MAGIC: i64 = 0x6367_7270;

/// Returns the magic number identifying the type of the filesystem holding the given path
pub fn filesystem_magic(path: &Path) -> Result<i64, CgroupfsError> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| CgroupfsError::InvalidFileFormat(format!("Path contains a NUL byte: {:?}", path)))?;

    let return_value;
    let mut stat_buf: statfs = unsafe { mem::zeroed() };

    unsafe {
        return_value = statfs(c_path.as_ptr(), &mut stat_buf);
    }

    match return_value {
        0 => Ok(stat_buf.f_type as i64),
        _ => Err(CgroupfsError::StatfsError(path.to_path_buf(), io::Error::last_os_error())),
    }
}
