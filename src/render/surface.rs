//=========================================================================
// Surface Targets
//=========================================================================
//
// Native presentation targets, expressed as `raw-window-handle` pairs so
// any backend built on that ecosystem can consume them.
//
//=========================================================================

use std::ffi::{c_int, c_ulong, c_void};
use std::num::NonZeroIsize;
use std::ptr::NonNull;

use raw_window_handle::{
    HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle, Win32WindowHandle,
    WindowsDisplayHandle, XlibDisplayHandle, XlibWindowHandle,
};

use super::backend::RendererError;

//=== SurfaceTarget =======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTarget {
    Native {
        window: RawWindowHandle,
        display: RawDisplayHandle,
    },
    /// Off-screen target, used without a native window.
    Headless,
}

impl SurfaceTarget {
    /// Win32 window. Returns `None` for a null `hwnd`.
    pub fn win32(hinstance: isize, hwnd: isize) -> Option<Self> {
        let mut window = Win32WindowHandle::new(NonZeroIsize::new(hwnd)?);
        window.hinstance = NonZeroIsize::new(hinstance);

        Some(Self::Native {
            window: RawWindowHandle::Win32(window),
            display: RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
        })
    }

    /// Xlib window on `display` (null selects the default display).
    /// Returns `None` for window id 0.
    pub fn xlib(window: c_ulong, display: *mut c_void, screen: c_int) -> Option<Self> {
        if window == 0 {
            return None;
        }

        Some(Self::Native {
            window: RawWindowHandle::Xlib(XlibWindowHandle::new(window)),
            display: RawDisplayHandle::Xlib(XlibDisplayHandle::new(NonNull::new(display), screen)),
        })
    }

    /// Captures the handles of a live window.
    pub fn from_window<W>(window: &W) -> Result<Self, RendererError>
    where
        W: HasWindowHandle + HasDisplayHandle,
    {
        let handle = window
            .window_handle()
            .map_err(|e| RendererError::Backend(format!("window handle unavailable: {e}")))?;
        let display = window
            .display_handle()
            .map_err(|e| RendererError::Backend(format!("display handle unavailable: {e}")))?;

        Ok(Self::Native {
            window: handle.as_raw(),
            display: display.as_raw(),
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_native_windows_are_rejected() {
        assert!(SurfaceTarget::win32(1, 0).is_none());
        assert!(SurfaceTarget::xlib(0, std::ptr::null_mut(), 0).is_none());
    }

    #[test]
    fn win32_target_keeps_handles() {
        let target = SurfaceTarget::win32(0x400000, 0x1234).unwrap();

        let SurfaceTarget::Native { window: RawWindowHandle::Win32(handle), .. } = target else {
            panic!("expected a win32 target");
        };
        assert_eq!(handle.hwnd.get(), 0x1234);
        assert_eq!(handle.hinstance.map(NonZeroIsize::get), Some(0x400000));
    }

    #[test]
    fn xlib_target_accepts_default_display() {
        let target = SurfaceTarget::xlib(42, std::ptr::null_mut(), 0).unwrap();

        let SurfaceTarget::Native { window: RawWindowHandle::Xlib(handle), display } = target else {
            panic!("expected an xlib target");
        };
        assert_eq!(handle.window, 42);
        assert!(matches!(display, RawDisplayHandle::Xlib(d) if d.display.is_none()));
    }
}
