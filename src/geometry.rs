//! The single growable vertex buffer every model of a level lives in.
//!
//! [`GeometryBuffer`] keeps the bookkeeping (running byte size, init/format
//! state) and delegates storage to a [`VertexStore`]. [`WgpuStore`] is the GPU
//! backend; [`HostStore`] keeps the bytes in host memory for headless runs.
//!
//! # Lifecycle
//!
//! 1. `init(reserve)` allocates storage, ideally sized for the whole level
//! 2. `add_data` appends one model after another and returns its byte offset
//! 3. `format_layout` declares the vertex layout once, sealing the buffer
//! 4. `delete` releases the storage before the next level is built
//!
//! Appends past the reservation grow the storage and keep every byte written
//! so far at its original offset.

use std::iter;

use crate::{
    data_structures::vertex::{VERTEX_SIZE, Vertex},
    error::GpuError,
};

/// Backing storage of a [`GeometryBuffer`].
pub trait VertexStore {
    /// Allocate `capacity` bytes, dropping any previous allocation and its contents.
    fn allocate(&mut self, capacity: u64) -> Result<(), GpuError>;

    /// Move to a larger allocation of `capacity` bytes keeping the first `keep` bytes.
    fn grow(&mut self, capacity: u64, keep: u64) -> Result<(), GpuError>;

    /// Write `bytes` at `offset`. The range must fit the current allocation.
    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), GpuError>;

    fn release(&mut self);

    /// Allocated bytes, `None` while nothing is allocated.
    fn capacity(&self) -> Option<u64>;
}

/// Host-memory store.
#[derive(Debug, Default)]
pub struct HostStore {
    bytes: Option<Vec<u8>>,
}

impl HostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents including unused reserved bytes.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl VertexStore for HostStore {
    fn allocate(&mut self, capacity: u64) -> Result<(), GpuError> {
        self.bytes = Some(vec![0; capacity as usize]);
        Ok(())
    }

    fn grow(&mut self, capacity: u64, keep: u64) -> Result<(), GpuError> {
        let bytes = self.bytes.as_mut().ok_or(GpuError::NotInitialized)?;
        bytes.truncate(keep as usize);
        bytes.resize(capacity as usize, 0);
        Ok(())
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), GpuError> {
        let bytes = self.bytes.as_mut().ok_or(GpuError::NotInitialized)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > bytes.len() {
            return Err(GpuError::OutOfMemory {
                requested: end as u64,
                limit: bytes.len() as u64,
            });
        }
        bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    fn release(&mut self) {
        self.bytes = None;
    }

    fn capacity(&self) -> Option<u64> {
        self.bytes.as_ref().map(|bytes| bytes.len() as u64)
    }
}

/// GPU store backed by a single `wgpu::Buffer`.
///
/// Growing copies the old contents into the new buffer on the GPU with
/// `copy_buffer_to_buffer`; nothing is staged on the host.
#[derive(Debug)]
pub struct WgpuStore {
    device: wgpu::Device,
    queue: wgpu::Queue,
    buffer: Option<wgpu::Buffer>,
}

impl WgpuStore {
    // The clones only copy the internal Arcs of Device and Queue
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            buffer: None,
        }
    }

    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    fn create_buffer(&self, capacity: u64) -> Result<wgpu::Buffer, GpuError> {
        let limit = self.device.limits().max_buffer_size;
        if capacity > limit {
            return Err(GpuError::OutOfMemory {
                requested: capacity,
                limit,
            });
        }
        // zero-sized buffers cannot be sliced, keep at least one aligned word
        let size = align_to(capacity, wgpu::COPY_BUFFER_ALIGNMENT).max(wgpu::COPY_BUFFER_ALIGNMENT);
        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Geometry Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        }))
    }

    /// Copy `len` bytes from the start of the buffer back to the host.
    pub async fn read_back(&self, len: u64) -> anyhow::Result<Vec<u8>> {
        let buffer = self.buffer.as_ref().ok_or(GpuError::NotInitialized)?;
        let size = align_to(len, wgpu::COPY_BUFFER_ALIGNMENT);
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Geometry Read Back"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Read Back Encoder"),
            });
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.queue.submit(iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(instant::Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow::anyhow!("read back channel closed"))??;
        let bytes = slice.get_mapped_range()[..len as usize].to_vec();
        staging.unmap();
        Ok(bytes)
    }
}

impl VertexStore for WgpuStore {
    fn allocate(&mut self, capacity: u64) -> Result<(), GpuError> {
        self.release();
        self.buffer = Some(self.create_buffer(capacity)?);
        Ok(())
    }

    fn grow(&mut self, capacity: u64, keep: u64) -> Result<(), GpuError> {
        let old = self.buffer.take().ok_or(GpuError::NotInitialized)?;
        let new = match self.create_buffer(capacity) {
            Ok(buffer) => buffer,
            Err(e) => {
                self.buffer = Some(old);
                return Err(e);
            }
        };
        let keep = align_to(keep, wgpu::COPY_BUFFER_ALIGNMENT);
        if keep > 0 {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Geometry Grow Encoder"),
                });
            encoder.copy_buffer_to_buffer(&old, 0, &new, 0, keep);
            self.queue.submit(iter::once(encoder.finish()));
        }
        old.destroy();
        self.buffer = Some(new);
        Ok(())
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), GpuError> {
        let buffer = self.buffer.as_ref().ok_or(GpuError::NotInitialized)?;
        let len = bytes.len() as u64;
        if offset % wgpu::COPY_BUFFER_ALIGNMENT != 0 || len % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(GpuError::Misaligned {
                offset,
                len,
                alignment: wgpu::COPY_BUFFER_ALIGNMENT,
            });
        }
        if offset + len > buffer.size() {
            return Err(GpuError::OutOfMemory {
                requested: offset + len,
                limit: buffer.size(),
            });
        }
        self.queue.write_buffer(buffer, offset, bytes);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            buffer.destroy();
        }
    }

    fn capacity(&self) -> Option<u64> {
        self.buffer.as_ref().map(wgpu::Buffer::size)
    }
}

fn align_to(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// The append-only vertex buffer of the current level.
///
/// Invariant: `size()` equals the summed byte length of every vertex run
/// appended since the last `init`, and each run lives at the size the buffer
/// had right before it was appended.
#[derive(Debug)]
pub struct GeometryBuffer<S: VertexStore> {
    store: S,
    size: u64,
    initialized: bool,
    formatted: bool,
}

impl<S: VertexStore> GeometryBuffer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            size: 0,
            initialized: false,
            formatted: false,
        }
    }

    /// Create empty storage with room for `reserve` bytes.
    pub fn init(&mut self, reserve: u64) -> Result<(), GpuError> {
        self.store.allocate(reserve)?;
        self.size = 0;
        self.initialized = true;
        self.formatted = false;
        log::debug!("geometry buffer initialized, {} bytes reserved", reserve);
        Ok(())
    }

    /// Release the storage. Safe to call on a buffer that was never initialized.
    pub fn delete(&mut self) {
        self.store.release();
        self.size = 0;
        self.initialized = false;
        self.formatted = false;
    }

    /// Append a run of vertices and return the byte offset it was written at.
    pub fn add_data(&mut self, vertices: &[Vertex]) -> Result<u64, GpuError> {
        if !self.initialized {
            return Err(GpuError::NotInitialized);
        }
        if self.formatted {
            return Err(GpuError::Sealed);
        }
        let offset = self.size;
        if vertices.is_empty() {
            return Ok(offset);
        }
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let end = offset + bytes.len() as u64;
        let capacity = self.store.capacity().ok_or(GpuError::NotInitialized)?;
        if end > capacity {
            log::debug!(
                "geometry buffer grows from {} to {} bytes past its reservation",
                capacity,
                end
            );
            self.store.grow(end, offset)?;
        }
        self.store.write(offset, bytes)?;
        self.size = end;
        Ok(offset)
    }

    /// Declare how the GPU reads a [`Vertex`] from this buffer and seal it.
    ///
    /// Must be called exactly once, after the last append. wgpu bakes vertex
    /// layouts into the render pipeline, which is built from the same
    /// [`Vertex::desc`] before any level loads, so the returned layout only
    /// describes the sealed contents; no GPU state changes here.
    pub fn format_layout(&mut self) -> Result<wgpu::VertexBufferLayout<'static>, GpuError> {
        if !self.initialized {
            return Err(GpuError::NotInitialized);
        }
        if self.formatted {
            return Err(GpuError::AlreadyFormatted);
        }
        self.formatted = true;
        Ok(Vertex::desc())
    }

    /// Precondition of every draw: initialized and formatted.
    pub fn ensure_drawable(&self) -> Result<(), GpuError> {
        if !self.initialized {
            Err(GpuError::NotInitialized)
        } else if !self.formatted {
            Err(GpuError::NotFormatted)
        } else {
            Ok(())
        }
    }

    /// Bytes written so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn vertex_count(&self) -> u64 {
        self.size / VERTEX_SIZE
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_formatted(&self) -> bool {
        self.formatted
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
