//! Fixed-capacity sample queue used for a channel's input and output.

use std::ops::AddAssign;

/// Fixed-capacity FIFO of samples with independent read and write cursors.
///
/// No method allocates except [`RingBuffer::with_capacity`] and
/// [`RingBuffer::resized`]. Bulk transfers copy in at most two contiguous
/// spans.
#[derive(Debug, Clone)]
pub struct RingBuffer<T>
where
    T: Copy + Default,
{
    data: Vec<T>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> RingBuffer<T>
where
    T: Copy + Default,
{
    /// Creates an empty queue holding at most `cap` samples.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            data: vec![T::default(); cap],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Number of samples waiting to be read.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Free space available for writing.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity() - self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops all buffered samples. Capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Appends as many samples from `input` as fit.
    ///
    /// Returns the number written.
    pub fn write(&mut self, input: &[T]) -> usize {
        let n = input.len().min(self.available());
        if n == 0 {
            return 0;
        }
        let first = n.min(self.capacity() - self.tail);
        self.data[self.tail..self.tail + first].copy_from_slice(&input[..first]);
        let second = n - first;
        if second > 0 {
            self.data[..second].copy_from_slice(&input[first..n]);
        }
        self.advance_tail(n);
        n
    }

    /// Appends up to `n` zero-valued samples. Returns the number written.
    pub fn write_zeros(&mut self, n: usize) -> usize {
        let n = n.min(self.available());
        if n == 0 {
            return 0;
        }
        let first = n.min(self.capacity() - self.tail);
        self.data[self.tail..self.tail + first].fill(T::default());
        self.data[..n - first].fill(T::default());
        self.advance_tail(n);
        n
    }

    /// Pops up to `output.len()` samples into `output`. Returns the number read.
    pub fn read(&mut self, output: &mut [T]) -> usize {
        let n = self.peek(output);
        self.advance_head(n);
        n
    }

    /// Copies up to `output.len()` samples from the front without consuming them.
    pub fn peek(&self, output: &mut [T]) -> usize {
        let n = output.len().min(self.len);
        if n == 0 {
            return 0;
        }
        let first = n.min(self.capacity() - self.head);
        output[..first].copy_from_slice(&self.data[self.head..self.head + first]);
        let second = n - first;
        if second > 0 {
            output[first..n].copy_from_slice(&self.data[..second]);
        }
        n
    }

    /// Discards up to `n` samples from the front. Returns the number discarded.
    pub fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        self.advance_head(n);
        n
    }

    /// Returns a new queue of capacity `new_cap` holding the oldest
    /// `min(len, new_cap)` samples of this one.
    pub fn resized(&self, new_cap: usize) -> Self {
        let mut out = Self::with_capacity(new_cap);
        let keep = self.len.min(new_cap);
        out.len = self.peek(&mut out.data[..keep]);
        out.tail = if new_cap == 0 { 0 } else { keep % new_cap };
        out
    }

    fn advance_tail(&mut self, n: usize) {
        self.tail = (self.tail + n) % self.capacity();
        self.len += n;
    }

    fn advance_head(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.head = (self.head + n) % self.capacity();
        self.len -= n;
        if self.len == 0 {
            self.head = 0;
            self.tail = 0;
        }
    }
}

impl<T> RingBuffer<T>
where
    T: Copy + Default + AddAssign,
{
    /// Pops up to `output.len()` samples, adding them to what is already in
    /// `output` instead of overwriting.
    pub fn read_adding(&mut self, output: &mut [T]) -> usize {
        let n = output.len().min(self.len);
        if n == 0 {
            return 0;
        }
        let first = n.min(self.capacity() - self.head);
        for (o, &s) in output[..first]
            .iter_mut()
            .zip(&self.data[self.head..self.head + first])
        {
            *o += s;
        }
        for (o, &s) in output[first..n].iter_mut().zip(&self.data[..n - first]) {
            *o += s;
        }
        self.advance_head(n);
        n
    }
}
