//! Pixel sources consumed by the PNG encoder.

/// A fixed-size grid of 8-bit RGB pixels.
///
/// This is the only thing the encoder knows about its input, so every
/// decoded dataset format only needs to provide `pixel(x, y)`.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Color at column `x`, row `y`. Callers stay within `width x height`.
    fn pixel(&self, x: u32, y: u32) -> [u8; 3];
}

impl<S: PixelSource + ?Sized> PixelSource for &S {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        (**self).pixel(x, y)
    }
}

/// Closure-backed source.
#[derive(Clone, Copy)]
pub struct FnSource<F> {
    width: u32,
    height: u32,
    f: F,
}

impl<F: Fn(u32, u32) -> [u8; 3]> FnSource<F> {
    pub fn new(width: u32, height: u32, f: F) -> Self {
        Self { width, height, f }
    }
}

impl<F: Fn(u32, u32) -> [u8; 3]> PixelSource for FnSource<F> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        (self.f)(x, y)
    }
}

/// Single-channel plane, emitted as R=G=B.
#[derive(Debug, Clone, Copy)]
pub struct GrayPlane<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> GrayPlane<'a> {
    /// `data` must hold at least `width * height` bytes, row-major.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self {
        debug_assert!(data.len() >= width as usize * height as usize);
        Self { width, height, data }
    }
}

impl PixelSource for GrayPlane<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let v = self.data[y as usize * self.width as usize + x as usize];
        [v, v, v]
    }
}

/// Three separate row-major color planes.
#[derive(Debug, Clone, Copy)]
pub struct RgbPlanes<'a> {
    width: u32,
    height: u32,
    red: &'a [u8],
    green: &'a [u8],
    blue: &'a [u8],
}

impl<'a> RgbPlanes<'a> {
    pub fn new(width: u32, height: u32, red: &'a [u8], green: &'a [u8], blue: &'a [u8]) -> Self {
        let n = width as usize * height as usize;
        debug_assert!(red.len() >= n && green.len() >= n && blue.len() >= n);
        Self { width, height, red, green, blue }
    }
}

impl PixelSource for RgbPlanes<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = y as usize * self.width as usize + x as usize;
        [self.red[i], self.green[i], self.blue[i]]
    }
}

/// Owned interleaved RGB buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbBuffer {
    /// Black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn put(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Interleaved bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl PixelSource for RgbBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}
