//! Integration tests for the packed triangular solve

mod common;

use common::{assert_allclose_f64, create_handle, upload};
use numr_blas::error::Error;
use numr_blas::ops::{Diagonal, Fill, Operation, tpsv, tpsv_batched, tpsv_strided_batched};
use numr_blas::reference::{ref_tpsv, vector_norm_1};
use numr_blas::runtime::DevicePtr;
use numr_blas::verify::{
    diagonally_dominant_triangular, general_matrix, make_unit_diagonal, regular_to_packed, seeded_rng,
};

fn packed_case(seed: u64, uplo: Fill, diag: Diagonal, n: usize) -> Vec<f64> {
    let mut rng = seeded_rng(seed);
    let mut a = diagonally_dominant_triangular(&mut rng, uplo, n, n);
    if diag == Diagonal::Unit {
        make_unit_diagonal(uplo, &mut a, n, n);
    }
    regular_to_packed(uplo, &a, n, n)
}

#[test]
fn test_tpsv_matches_reference() {
    let handle = create_handle();
    let n = 33;
    let mut seed = 0;
    for uplo in [Fill::Lower, Fill::Upper] {
        for trans in [Operation::None, Operation::Transpose, Operation::ConjugateTranspose] {
            for diag in [Diagonal::NonUnit, Diagonal::Unit] {
                for incx in [1i64, 3, -2] {
                    seed += 1;
                    let ap = packed_case(seed, uplo, diag, n);
                    let len = 1 + (n - 1) * incx.unsigned_abs() as usize;
                    let x0: Vec<f64> = general_matrix(&mut seeded_rng(seed + 1000), len, 1, len);
                    let mut expected = x0.clone();
                    ref_tpsv(uplo, trans, diag, n, &ap, &mut expected, incx);

                    let dap = upload(&handle, &ap);
                    let dx = upload(&handle, &x0);
                    unsafe { tpsv(Some(&handle), uplo, trans, diag, n as i64, dap.as_ptr(), dx.as_ptr(), incx).unwrap() };
                    let got = dx.to_host();
                    let err = vector_norm_1(n, &expected, incx, &got, incx);
                    assert!(err < 1e-13, "{uplo} {trans} {diag} incx={incx}: err {err}");
                }
            }
        }
    }
}

#[test]
fn test_tpsv_batched_forms() {
    let handle = create_handle();
    let (n, batch) = (6usize, 3usize);
    let aps: Vec<Vec<f64>> = (0..batch).map(|i| packed_case(i as u64, Fill::Lower, Diagonal::NonUnit, n)).collect();
    let xs: Vec<Vec<f64>> = (0..batch).map(|i| general_matrix(&mut seeded_rng(50 + i as u64), n, 1, n)).collect();
    let expected: Vec<f64> = aps
        .iter()
        .zip(&xs)
        .flat_map(|(ap, x)| {
            let mut x = x.clone();
            ref_tpsv(Fill::Lower, Operation::Transpose, Diagonal::NonUnit, n, ap, &mut x, 1);
            x
        })
        .collect();

    let stride_ap = n * (n + 1) / 2;
    let dap = upload(&handle, &aps.concat());
    let dx = upload(&handle, &xs.concat());
    unsafe {
        tpsv_strided_batched(
            Some(&handle),
            Fill::Lower,
            Operation::Transpose,
            Diagonal::NonUnit,
            n as i64,
            dap.as_ptr(),
            stride_ap as i64,
            dx.as_ptr(),
            1,
            n as i64,
            batch as i64,
        )
        .unwrap()
    };
    assert_allclose_f64(&dx.to_host(), &expected, 1e-13, 1e-14, "strided");

    let dx = upload(&handle, &xs.concat());
    let ap_arr = upload(&handle, &(0..batch).map(|i| dap.as_ptr().offset((i * stride_ap) as isize)).collect::<Vec<_>>());
    let x_arr = upload(&handle, &(0..batch).map(|i| dx.as_ptr().offset((i * n) as isize)).collect::<Vec<_>>());
    unsafe {
        tpsv_batched(
            Some(&handle),
            Fill::Lower,
            Operation::Transpose,
            Diagonal::NonUnit,
            n as i32,
            ap_arr.as_ptr(),
            x_arr.as_ptr(),
            1,
            batch as i32,
        )
        .unwrap()
    };
    assert_allclose_f64(&dx.to_host(), &expected, 1e-13, 1e-14, "pointer array");
}

#[test]
fn test_tpsv_bad_args() {
    let handle = create_handle();
    let null = DevicePtr::<f64>::null();
    let r = unsafe { tpsv(Some(&handle), Fill::Full, Operation::None, Diagonal::Unit, 2i64, null, null, 1) };
    assert!(matches!(r, Err(Error::InvalidValue { .. })));
    let r = unsafe { tpsv(Some(&handle), Fill::Upper, Operation::None, Diagonal::Unit, -1i64, null, null, 1) };
    assert!(matches!(r, Err(Error::InvalidSize { arg: "n", .. })));
    let r = unsafe { tpsv(Some(&handle), Fill::Upper, Operation::None, Diagonal::Unit, 2i64, null, null, 0) };
    assert!(matches!(r, Err(Error::InvalidSize { arg: "incx", .. })));
    let r = unsafe { tpsv(Some(&handle), Fill::Upper, Operation::None, Diagonal::Unit, 2i64, null, null, 1) };
    assert_eq!(r, Err(Error::invalid_pointer("AP")));
    assert_eq!(unsafe { tpsv(Some(&handle), Fill::Upper, Operation::None, Diagonal::Unit, 0i64, null, null, 1) }, Ok(()));
    assert_eq!(
        unsafe { tpsv_strided_batched(Some(&handle), Fill::Upper, Operation::None, Diagonal::Unit, 2i64, null, 0, null, 1, 0, 0) },
        Ok(())
    );
}
