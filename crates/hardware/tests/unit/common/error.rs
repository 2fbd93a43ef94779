//! Error Tests.
//!
//! Verifies error messages and conversions.

use std::io;

use vmsim_core::common::Error;

#[test]
fn bad_parameter_message() {
    let err = Error::BadParameter("physical address 0x00001002 is not word aligned".into());
    assert_eq!(
        err.to_string(),
        "bad parameter: physical address 0x00001002 is not word aligned"
    );
}

#[test]
fn out_of_bounds_message() {
    let err = Error::OutOfBounds {
        offset: 0x2000,
        len: 0x1000,
    };
    assert_eq!(
        err.to_string(),
        "access at offset 0x2000 is out of bounds (memory size 0x1000)"
    );
}

#[test]
fn allocation_message() {
    let err = Error::Allocation { bytes: 64 };
    assert_eq!(err.to_string(), "failed to allocate 64 bytes of simulated memory");
}

/// I/O errors convert with `?` and keep their source.
#[test]
fn io_converts() {
    fn open() -> vmsim_core::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no dump"))?;
        Ok(())
    }
    let err = open().unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(err.to_string(), "memory image I/O failed: no dump");
    assert!(std::error::Error::source(&err).is_some());
}
