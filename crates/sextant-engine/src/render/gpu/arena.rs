/// Per-frame bump allocator over one GPU buffer.
///
/// Every push lands at a fresh aligned offset, so draws recorded earlier in
/// the frame keep their data. When the buffer is full a larger one replaces
/// it; passes already recorded hold the old buffer alive until submission.
pub(super) struct Arena {
    label: &'static str,
    usage: wgpu::BufferUsages,
    alignment: u64,
    buffer: wgpu::Buffer,
    capacity: u64,
    cursor: u64,
    generation: u64,
}

impl Arena {
    pub(super) fn new(
        device: &wgpu::Device,
        label: &'static str,
        usage: wgpu::BufferUsages,
        capacity: u64,
        alignment: u64,
    ) -> Self {
        let capacity = capacity.max(256).next_power_of_two();
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        Self {
            label,
            usage,
            alignment: alignment.max(wgpu::COPY_BUFFER_ALIGNMENT),
            buffer: create(device, label, usage, capacity),
            capacity,
            cursor: 0,
            generation: 0,
        }
    }

    /// Starts a new frame; previous contents may be overwritten.
    pub(super) fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Writes `bytes` and returns their offset in [`buffer`](Self::buffer).
    ///
    /// Data is padded to the copy alignment; the returned offset refers to
    /// the first byte of `bytes`.
    pub(super) fn push(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) -> u64 {
        let padded = align_up(bytes.len() as u64, wgpu::COPY_BUFFER_ALIGNMENT);
        let mut offset = align_up(self.cursor, self.alignment);

        if offset + padded > self.capacity {
            let new_capacity = (padded.max(self.capacity) * 2).next_power_of_two();
            log::debug!("{}: growing {} -> {} bytes", self.label, self.capacity, new_capacity);
            self.buffer = create(device, self.label, self.usage, new_capacity);
            self.capacity = new_capacity;
            self.generation += 1;
            offset = 0;
        }

        if padded == bytes.len() as u64 {
            queue.write_buffer(&self.buffer, offset, bytes);
        } else {
            let mut tmp = bytes.to_vec();
            tmp.resize(padded as usize, 0);
            queue.write_buffer(&self.buffer, offset, &tmp);
        }
        self.cursor = offset + padded;
        offset
    }

    #[inline]
    pub(super) fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bumped whenever the buffer is replaced; bind groups built on the old
    /// buffer must be recreated.
    #[inline]
    pub(super) fn generation(&self) -> u64 {
        self.generation
    }
}

fn create(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    })
}

#[inline]
pub(super) fn align_up(v: u64, alignment: u64) -> u64 {
    v.div_ceil(alignment) * alignment
}
