use fluxbench::{Bencher, flux};
use std::hint::black_box;

use numr_blas::prelude::*;
use numr_blas::verify::{general_matrix, seeded_rng};

fn upload(handle: &Handle, rows: usize, cols: usize) -> DeviceBuffer<f64> {
    let host: Vec<f64> = general_matrix(&mut seeded_rng((rows * 31 + cols) as u64), rows, cols, rows);
    DeviceBuffer::from_host(handle.client(), &host).unwrap()
}

#[flux::bench(group = "trmm_f64", args = [64, 128, 256, 512])]
fn trmm_in_place(b: &mut Bencher, size: usize) {
    let handle = Handle::new(CpuDevice::new());
    let a = upload(&handle, size, size);
    let bm = upload(&handle, size, size);
    let alpha = 1.0f64;
    b.iter(|| {
        unsafe {
            trmm(
                Some(&handle),
                Side::Right,
                Fill::Upper,
                Operation::None,
                Diagonal::NonUnit,
                size as i64,
                size as i64,
                ScalarPtr::host(&alpha),
                a.as_ptr(),
                size as i64,
                bm.as_ptr(),
                size as i64,
            )
            .unwrap()
        };
        black_box(())
    });
}

#[flux::bench(group = "trmm_f64", args = [64, 128, 256, 512])]
fn trmm_out_of_place(b: &mut Bencher, size: usize) {
    let handle = Handle::new(CpuDevice::new());
    let a = upload(&handle, size, size);
    let bm = upload(&handle, size, size);
    let c = DeviceBuffer::<f64>::new(handle.client(), size * size).unwrap();
    let alpha = 1.0f64;
    b.iter(|| {
        unsafe {
            trmm_outofplace(
                Some(&handle),
                Side::Right,
                Fill::Upper,
                Operation::None,
                Diagonal::NonUnit,
                size as i64,
                size as i64,
                ScalarPtr::host(&alpha),
                a.as_ptr(),
                size as i64,
                bm.as_ptr(),
                size as i64,
                c.as_ptr(),
                size as i64,
            )
            .unwrap()
        };
        black_box(())
    });
}

#[flux::synthetic(
    id = "trmm_outofplace_ratio_512",
    formula = "trmm_out_of_place@512 / trmm_in_place@512",
    unit = "x"
)]
struct TrmmOutOfPlaceRatio512;

fn main() {
    fluxbench::run().unwrap();
}
