//! Live backend: GDI desktop capture and `SendInput` mouse/keyboard input.
//!
//! Coordinates are primary-monitor screen pixels. Input goes through
//! SendInput so the game sees hardware-level events; this moves the real
//! cursor.

use anyhow::{anyhow, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::time::Duration;

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC, GetDIBits,
    ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, SRCCOPY,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_KEYUP,
    MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEINPUT,
    MOUSE_EVENT_FLAGS, VIRTUAL_KEY, VK_DOWN, VK_LEFT, VK_RIGHT, VK_UP,
};
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

use super::{FrameSource, InputSink};
use crate::game::Move;
use crate::vision::BoundingRect;

fn screen_size() -> (i32, i32) {
    unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
}

/// Captures the primary monitor through GDI.
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Result<Self> {
        let (width, height) = screen_size();
        if width <= 0 || height <= 0 {
            return Err(anyhow!("Could not query screen size"));
        }
        crate::log(&format!("Screen capture ready: {}x{}", width, height));
        Ok(Self)
    }
}

impl FrameSource for ScreenCapture {
    fn capture(&mut self, region: Option<BoundingRect>) -> Result<Option<RgbaImage>> {
        let (width, height) = screen_size();
        let area = match region {
            Some(rect) => match rect.clamp_to(width as u32, height as u32) {
                Some(clamped) => clamped,
                None => return Ok(Some(RgbaImage::new(0, 0))),
            },
            None => BoundingRect::new(0, 0, width, height),
        };
        capture_rect(&area).map(Some)
    }
}

/// Copies a screen rectangle into an RGBA image.
fn capture_rect(area: &BoundingRect) -> Result<RgbaImage> {
    let (w, h) = (area.width, area.height);
    let mut buffer = vec![0u8; (w * h * 4) as usize];

    unsafe {
        let screen_dc = GetDC(HWND::default());
        if screen_dc.is_invalid() {
            return Err(anyhow!("GetDC failed"));
        }
        let memory_dc = CreateCompatibleDC(screen_dc);
        let bitmap = CreateCompatibleBitmap(screen_dc, w, h);
        let previous = SelectObject(memory_dc, bitmap);

        let blit = BitBlt(memory_dc, 0, 0, w, h, screen_dc, area.x, area.y, SRCCOPY);

        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: w,
                // Negative height requests a top-down bitmap
                biHeight: -h,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let lines = GetDIBits(
            memory_dc,
            bitmap,
            0,
            h as u32,
            Some(buffer.as_mut_ptr() as *mut _),
            &mut info,
            DIB_RGB_COLORS,
        );

        SelectObject(memory_dc, previous);
        let _ = DeleteObject(bitmap);
        let _ = DeleteDC(memory_dc);
        ReleaseDC(HWND::default(), screen_dc);

        blit?;
        if lines != h {
            return Err(anyhow!("GetDIBits copied {} of {} lines", lines, h));
        }
    }

    // BGRA -> RGBA
    let img: RgbaImage = ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
        let offset = ((y * w as u32 + x) * 4) as usize;
        Rgba([buffer[offset + 2], buffer[offset + 1], buffer[offset], 255])
    });
    Ok(img)
}

/// Sends clicks and arrow keys with SendInput.
pub struct SendInputSink {
    /// Pause between the focusing click and the key press
    focus_delay: Duration,
}

impl SendInputSink {
    pub fn new(focus_delay: Duration) -> Self {
        Self { focus_delay }
    }
}

fn send(inputs: &[INPUT]) -> Result<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(anyhow!("SendInput delivered {} of {} events", sent, inputs.len()));
    }
    Ok(())
}

fn mouse_input(x: i32, y: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: x,
                dy: y,
                dwFlags: flags | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE,
                ..Default::default()
            },
        },
    }
}

fn key_input(key: VIRTUAL_KEY, up: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: key,
                dwFlags: if up { KEYEVENTF_KEYUP } else { Default::default() },
                ..Default::default()
            },
        },
    }
}

impl InputSink for SendInputSink {
    fn focus(&mut self, x: i32, y: i32) -> Result<()> {
        let (width, height) = screen_size();
        if width <= 0 || height <= 0 {
            return Err(anyhow!("Could not query screen size"));
        }

        // Normalize to 0-65535 range (required by MOUSEEVENTF_ABSOLUTE)
        let norm_x = ((x as i64 * 65535) / width as i64) as i32;
        let norm_y = ((y as i64 * 65535) / height as i64) as i32;

        send(&[mouse_input(norm_x, norm_y, Default::default())])?;
        std::thread::sleep(Duration::from_millis(20));
        send(&[mouse_input(norm_x, norm_y, MOUSEEVENTF_LEFTDOWN)])?;
        send(&[mouse_input(norm_x, norm_y, MOUSEEVENTF_LEFTUP)])?;

        std::thread::sleep(self.focus_delay);
        Ok(())
    }

    fn press(&mut self, mv: Move) -> Result<()> {
        let key = match mv {
            Move::Up => VK_UP,
            Move::Down => VK_DOWN,
            Move::Left => VK_LEFT,
            Move::Right => VK_RIGHT,
            Move::None => return Ok(()),
        };
        send(&[key_input(key, false), key_input(key, true)])
    }
}
