//! Terminal size probing.

pub const FALLBACK_COLUMNS: u16 = 80;

/// Width of the terminal attached to stdout, or [`FALLBACK_COLUMNS`] when
/// stdout is not a terminal.
#[must_use]
pub fn columns() -> u16 {
    read_columns(libc::STDOUT_FILENO).unwrap_or(FALLBACK_COLUMNS)
}

#[cfg(unix)]
fn read_columns(fd: libc::c_int) -> Option<u16> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 {
        Some(size.ws_col)
    } else {
        None
    }
}

#[cfg(not(unix))]
fn read_columns(_fd: libc::c_int) -> Option<u16> {
    None
}

#[cfg(test)]
mod tests {
    use super::{columns, read_columns};

    #[test]
    fn invalid_descriptor_has_no_size() {
        assert_eq!(read_columns(-1), None);
    }

    #[test]
    fn columns_is_never_zero() {
        assert!(columns() > 0);
    }
}
