//! Cell-centred multi-component field with ghost cells, plus the
//! race-free accumulator used when markers scatter into it.

use crate::error::{IbError, IbResult};
use glam::IVec3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Multi-component field on one box of the coupling level.
///
/// The valid (owned) region is `lo..=hi`; `n_ghost` extra layers surround
/// it on every side. Storage is component-major with x fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct EulerField {
    lo: IVec3,
    hi: IVec3,
    n_ghost: i32,
    n_comp: usize,
    data: Vec<f64>,
}

impl EulerField {
    pub fn new(lo: IVec3, hi: IVec3, n_ghost: i32, n_comp: usize) -> IbResult<Self> {
        if hi.cmplt(lo).any() {
            return Err(IbError::config(format!(
                "empty box: lo = {lo:?}, hi = {hi:?}"
            )));
        }
        if n_ghost < 0 {
            return Err(IbError::config("ghost width cannot be negative"));
        }
        if n_comp == 0 {
            return Err(IbError::config("field needs at least one component"));
        }
        let extent = hi - lo + IVec3::splat(1 + 2 * n_ghost);
        let n_points = (extent.x as usize) * (extent.y as usize) * (extent.z as usize);
        Ok(Self {
            lo,
            hi,
            n_ghost,
            n_comp,
            data: vec![0.0; n_points * n_comp],
        })
    }

    pub fn lo(&self) -> IVec3 {
        self.lo
    }

    pub fn hi(&self) -> IVec3 {
        self.hi
    }

    pub fn n_ghost(&self) -> i32 {
        self.n_ghost
    }

    pub fn n_comp(&self) -> usize {
        self.n_comp
    }

    fn grown_lo(&self) -> IVec3 {
        self.lo - IVec3::splat(self.n_ghost)
    }

    fn grown_hi(&self) -> IVec3 {
        self.hi + IVec3::splat(self.n_ghost)
    }

    fn extent(&self) -> IVec3 {
        self.grown_hi() - self.grown_lo() + IVec3::ONE
    }

    /// Number of stored points per component (valid + ghost).
    pub fn n_points(&self) -> usize {
        let e = self.extent();
        (e.x as usize) * (e.y as usize) * (e.z as usize)
    }

    /// True if `cell` lies in the valid region or its ghost layers.
    pub fn contains(&self, cell: IVec3) -> bool {
        cell.cmpge(self.grown_lo()).all() && cell.cmple(self.grown_hi()).all()
    }

    pub fn is_valid(&self, cell: IVec3) -> bool {
        cell.cmpge(self.lo).all() && cell.cmple(self.hi).all()
    }

    /// Linear point index of `cell` within one component.
    #[inline]
    pub fn point_index(&self, cell: IVec3) -> usize {
        let rel = cell - self.grown_lo();
        let e = self.extent();
        ((rel.z as usize) * (e.y as usize) + rel.y as usize) * (e.x as usize) + rel.x as usize
    }

    #[inline]
    fn cell_of_point(&self, point: usize) -> IVec3 {
        decode(point, self.grown_lo(), self.extent())
    }

    pub fn get(&self, cell: IVec3, comp: usize) -> f64 {
        self.data[comp * self.n_points() + self.point_index(cell)]
    }

    pub fn set(&mut self, cell: IVec3, comp: usize, value: f64) {
        let idx = comp * self.n_points() + self.point_index(cell);
        self.data[idx] = value;
    }

    pub fn component(&self, comp: usize) -> &[f64] {
        let n = self.n_points();
        &self.data[comp * n..(comp + 1) * n]
    }

    pub fn component_mut(&mut self, comp: usize) -> &mut [f64] {
        let n = self.n_points();
        &mut self.data[comp * n..(comp + 1) * n]
    }

    /// Fill `count` components starting at `first` with `value`, ghosts included.
    pub fn fill_components(&mut self, first: usize, count: usize, value: f64) {
        let n = self.n_points();
        self.data[first * n..(first + count) * n]
            .par_iter_mut()
            .for_each(|v| *v = value);
    }

    /// `dst += a * src` for `count` components over the valid region.
    pub fn saxpy(&mut self, dst: usize, a: f64, src: usize, count: usize) {
        let n = self.n_points();
        let lo = self.lo;
        let hi = self.hi;
        let grown_lo = self.grown_lo();
        let extent = self.extent();
        for c in 0..count {
            let (dst_slice, src_slice) = split_components(&mut self.data, n, dst + c, src + c);
            dst_slice
                .par_iter_mut()
                .zip(src_slice.par_iter())
                .enumerate()
                .for_each(|(point, (d, s))| {
                    let cell = decode(point, grown_lo, extent);
                    if cell.cmpge(lo).all() && cell.cmple(hi).all() {
                        *d += a * s;
                    }
                });
        }
    }

    /// Iterator over every valid cell, x fastest.
    pub fn valid_cells(&self) -> impl Iterator<Item = IVec3> + '_ {
        (self.lo.z..=self.hi.z).flat_map(move |k| {
            (self.lo.y..=self.hi.y)
                .flat_map(move |j| (self.lo.x..=self.hi.x).map(move |i| IVec3::new(i, j, k)))
        })
    }

    /// Add an accumulator's contents into `count` components starting at `first`.
    pub fn add_accumulated(&mut self, first: usize, acc: &ForceAccumulator) {
        let n = self.n_points();
        let count = acc.n_comp();
        debug_assert_eq!(acc.n_points(), n);
        self.data[first * n..(first + count) * n]
            .par_iter_mut()
            .zip(acc.cells.par_iter())
            .for_each(|(v, a)| *v += f64::from_bits(a.load(Ordering::Relaxed)));
    }

    /// Sum of one component over the valid region.
    pub fn valid_sum(&self, comp: usize) -> f64 {
        let slice = self.component(comp);
        (0..slice.len())
            .filter(|&p| self.is_valid(self.cell_of_point(p)))
            .map(|p| slice[p])
            .sum()
    }
}

#[inline]
fn decode(point: usize, grown_lo: IVec3, extent: IVec3) -> IVec3 {
    let ex = extent.x as usize;
    let ey = extent.y as usize;
    grown_lo
        + IVec3::new(
            (point % ex) as i32,
            ((point / ex) % ey) as i32,
            (point / (ex * ey)) as i32,
        )
}

fn split_components(data: &mut [f64], n: usize, dst: usize, src: usize) -> (&mut [f64], &[f64]) {
    debug_assert_ne!(dst, src);
    if dst < src {
        let (head, tail) = data.split_at_mut(src * n);
        (&mut head[dst * n..(dst + 1) * n], &tail[..n])
    } else {
        let (head, tail) = data.split_at_mut(dst * n);
        (&mut tail[..n], &head[src * n..(src + 1) * n])
    }
}

/// Shared scatter target: `n_comp` components shaped like a field,
/// each slot an `f64` stored as bits and updated by compare-and-swap.
pub struct ForceAccumulator {
    n_points: usize,
    n_comp: usize,
    cells: Vec<AtomicU64>,
}

impl ForceAccumulator {
    pub fn new(n_points: usize, n_comp: usize) -> Self {
        Self {
            n_points,
            n_comp,
            cells: (0..n_points * n_comp).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Accumulator sized for `field`, holding three components.
    pub fn for_field(field: &EulerField) -> Self {
        Self::new(field.n_points(), 3)
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn n_comp(&self) -> usize {
        self.n_comp
    }

    pub fn reset(&self) {
        self.cells
            .par_iter()
            .for_each(|c| c.store(0f64.to_bits(), Ordering::Relaxed));
    }

    #[inline]
    fn atomic_add(slot: &AtomicU64, val: f64) {
        let mut old = slot.load(Ordering::Relaxed);
        loop {
            let new = (f64::from_bits(old) + val).to_bits();
            match slot.compare_exchange_weak(old, new, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(current) => old = current,
            }
        }
    }

    /// Thread-safe `slot[comp][point] += val`.
    #[inline]
    pub fn add(&self, point: usize, comp: usize, val: f64) {
        Self::atomic_add(&self.cells[comp * self.n_points + point], val);
    }

    pub fn load(&self, point: usize, comp: usize) -> f64 {
        f64::from_bits(self.cells[comp * self.n_points + point].load(Ordering::Relaxed))
    }
}
