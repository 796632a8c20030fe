/// `dsp/fft_cache.rs` — size-keyed cache of real FFT plans and buffers
///
/// Building a plan is expensive compared to running it, so scripts that call
/// `fft_forward` repeatedly share one `FftResource` per transform size.
/// The cache is a bounded LRU: once it holds `capacity` sizes, requesting a
/// new size evicts the least recently used one and frees its buffers.
use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex, OnceLock},
};

use lru::LruCache;
use realfft::{num_complex::Complex, FftError, RealFftPlanner, RealToComplex};

/// Capacity of the process-wide cache.
pub const DEFAULT_CAPACITY: usize = 5;

/// Scratch buffers and plan for one forward real transform length.
///
/// All buffers are sized for `size` at construction and dropped together
/// with the plan.
pub struct FftResource {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FftResource {
    /// `size` must be a power of two; callers validate before asking.
    pub fn new(size: usize) -> Self {
        // A planner per resource: the planner keeps its own plan cache,
        // which would otherwise outlive our evictions.
        let plan = RealFftPlanner::<f32>::new().plan_fft_forward(size);
        let input = plan.make_input_vec();
        let spectrum = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();
        Self {
            size,
            plan,
            input,
            spectrum,
            scratch,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform of `samples` into a freshly allocated vector of
    /// `size` values, packed as
    /// `[Re X0, Re X(n/2), Re X1, Im X1, Re X2, Im X2, …]`.
    ///
    /// `samples` shorter than the transform are zero-padded; extra samples
    /// are ignored.
    pub fn forward(&mut self, samples: &[f32]) -> Result<Vec<f32>, FftError> {
        self.input.fill(0.0);
        for (dst, src) in self.input.iter_mut().zip(samples) {
            *dst = *src;
        }

        self.plan
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)?;

        Ok(pack_spectrum(&self.spectrum, self.size))
    }
}

/// Pack a half spectrum of `n / 2 + 1` bins into `n` real values.
fn pack_spectrum(spectrum: &[Complex<f32>], n: usize) -> Vec<f32> {
    let mut out = vec![0.0_f32; n];
    if n == 0 {
        return out;
    }
    out[0] = spectrum[0].re;
    if n >= 2 {
        out[1] = spectrum[n / 2].re;
    }
    for k in 1..n / 2 {
        out[2 * k] = spectrum[k].re;
        out[2 * k + 1] = spectrum[k].im;
    }
    out
}

/// Bounded LRU map from transform size to `FftResource`.
///
/// Not internally synchronised; the process-wide instance sits behind a
/// mutex (see [`global`]).
pub struct FftCache {
    entries: LruCache<usize, FftResource>,
    constructed: u64,
}

impl FftCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            constructed: 0,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    /// Return the resource for `size`, building it on a miss.
    ///
    /// A hit marks the entry most recently used. A miss with a full cache
    /// evicts the least recently used entry.
    pub fn get(&mut self, size: usize) -> &mut FftResource {
        let constructed = &mut self.constructed;
        self.entries.get_or_insert_mut(size, || {
            log::debug!("[fft] building real FFT plan for size {size}");
            *constructed += 1;
            FftResource::new(size)
        })
    }

    /// Membership test that leaves recency untouched.
    pub fn contains(&self, size: usize) -> bool {
        self.entries.contains(&size)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Number of resources built since this cache was created.
    pub fn constructed(&self) -> u64 {
        self.constructed
    }
}

static FFT_CACHE: OnceLock<Mutex<FftCache>> = OnceLock::new();

/// Process-wide cache shared by every script primitive.
///
/// Built on first access and never torn down; its buffers are reclaimed at
/// process exit.
pub fn global() -> &'static Mutex<FftCache> {
    FFT_CACHE.get_or_init(|| Mutex::new(FftCache::with_default_capacity()))
}
