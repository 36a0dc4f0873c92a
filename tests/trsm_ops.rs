//! Integration tests for the triangular solve family

mod common;

use common::{TrsmCase, all_modes, create_handle, upload};
use numr_blas::dtype::{Complex64, Complex128, DType, Element};
use numr_blas::handle::{Handle, HandleConfig, PointerMode};
use numr_blas::ops::{
    Diagonal, Fill, Operation, ScalarPtr, Side, Single, TrsmWorkspace, trsm, trsm_batched,
    trsm_batched_ex, trsm_ex, trsm_strided_batched, trsm_strided_batched_ex, trsm_with_workspace,
    trtri_strided_batched,
};
use numr_blas::algorithm::{TRSM_BLOCK, inv_a_elems, trsm_workspace_sizes};
use numr_blas::error::Error;
use numr_blas::runtime::cpu::CpuDevice;
use numr_blas::runtime::{DeviceBuffer, DevicePtr};

fn run_single<T: Element>(handle: &Handle, case: &TrsmCase<T>) -> Vec<T> {
    let a = upload(handle, &case.a);
    let b = upload(handle, &case.b);
    unsafe {
        trsm(
            Some(handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            case.m as i64,
            case.n as i64,
            ScalarPtr::host(&case.alpha),
            a.as_ptr(),
            case.lda as i64,
            b.as_ptr(),
            case.ldb as i64,
        )
        .unwrap()
    };
    b.to_host()
}

#[test]
fn test_trsm_all_modes_small() {
    let handle = create_handle();
    for (i, (side, uplo, trans, diag)) in all_modes().into_iter().enumerate() {
        let case = TrsmCase::<f64>::new(i as u64, side, uplo, trans, diag, 7, 5, 1.5);
        case.check(&run_single(&handle, &case));
    }
}

#[test]
fn test_trsm_crosses_block_boundary() {
    // K = 150 spans one full 128 block and a partial one
    let handle = create_handle();
    for (i, (side, uplo, trans, diag)) in all_modes().into_iter().enumerate() {
        let (m, n) = if side == Side::Left { (150, 9) } else { (9, 150) };
        let case = TrsmCase::<f64>::new(100 + i as u64, side, uplo, trans, diag, m, n, -2.0);
        case.check(&run_single(&handle, &case));
    }
}

#[test]
fn test_trsm_exact_multiple_of_block() {
    let handle = create_handle();
    let case = TrsmCase::<f64>::new(
        3,
        Side::Left,
        Fill::Upper,
        Operation::Transpose,
        Diagonal::NonUnit,
        2 * TRSM_BLOCK,
        4,
        1.0,
    );
    case.check(&run_single(&handle, &case));
}

#[test]
fn test_trsm_f32() {
    let handle = create_handle();
    for (i, (side, uplo, trans, diag)) in all_modes().into_iter().enumerate() {
        let case = TrsmCase::<f32>::new(200 + i as u64, side, uplo, trans, diag, 130, 3, 0.5);
        case.check(&run_single(&handle, &case));
    }
}

#[test]
fn test_trsm_complex() {
    let handle = create_handle();
    let alpha = Complex128::new(1.0, -0.5);
    for (i, (side, uplo, trans, diag)) in all_modes().into_iter().enumerate() {
        let case = TrsmCase::<Complex128>::new(300 + i as u64, side, uplo, trans, diag, 12, 10, alpha);
        case.check(&run_single(&handle, &case));
    }
    let case = TrsmCase::<Complex64>::new(
        9,
        Side::Right,
        Fill::Lower,
        Operation::ConjugateTranspose,
        Diagonal::NonUnit,
        6,
        140,
        Complex64::new(2.0, 1.0),
    );
    case.check(&run_single(&handle, &case));
}

#[test]
fn test_trsm_i32_api() {
    let handle = create_handle();
    let case = TrsmCase::<f64>::new(4, Side::Left, Fill::Lower, Operation::None, Diagonal::Unit, 20, 3, 1.0);
    let a = upload(&handle, &case.a);
    let b = upload(&handle, &case.b);
    unsafe {
        trsm(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            case.m as i32,
            case.n as i32,
            ScalarPtr::host(&case.alpha),
            a.as_ptr(),
            case.lda as i32,
            b.as_ptr(),
            case.ldb as i32,
        )
        .unwrap()
    };
    case.check(&b.to_host());
}

#[test]
fn test_trsm_device_pointer_mode() {
    let mut handle = create_handle();
    handle.set_pointer_mode(PointerMode::Device);
    let case = TrsmCase::<f64>::new(5, Side::Right, Fill::Upper, Operation::Transpose, Diagonal::NonUnit, 10, 12, 3.0);
    let alpha = upload(&handle, &[case.alpha]);
    let a = upload(&handle, &case.a);
    let b = upload(&handle, &case.b);
    unsafe {
        trsm(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            case.m as i64,
            case.n as i64,
            ScalarPtr::device(alpha.as_ptr()),
            a.as_ptr(),
            case.lda as i64,
            b.as_ptr(),
            case.ldb as i64,
        )
        .unwrap()
    };
    case.check(&b.to_host());
}

#[test]
fn test_trsm_alpha_zero_ignores_a() {
    let handle = create_handle();
    let b = upload(&handle, &[1.0f64, 2.0, 3.0, 4.0]);
    let zero = 0.0f64;
    unsafe {
        trsm(
            Some(&handle),
            Side::Left,
            Fill::Lower,
            Operation::None,
            Diagonal::NonUnit,
            2i64,
            2,
            ScalarPtr::host(&zero),
            DevicePtr::null(),
            2,
            b.as_ptr(),
            2,
        )
        .unwrap()
    };
    assert_eq!(b.to_host(), vec![0.0; 4]);
}

#[test]
fn test_trsm_strided_batched() {
    let handle = create_handle();
    let batch = 4;
    let cases: Vec<_> = (0..batch)
        .map(|i| TrsmCase::<f64>::new(40 + i, Side::Left, Fill::Upper, Operation::Transpose, Diagonal::NonUnit, 33, 6, 1.25))
        .collect();
    let (lda, ldb) = (cases[0].lda, cases[0].ldb);
    let stride_a = cases[0].a.len() + 5;
    let stride_b = cases[0].b.len() + 1;
    let mut a_host = vec![0.0; stride_a * batch as usize];
    let mut b_host = vec![0.0; stride_b * batch as usize];
    for (i, c) in cases.iter().enumerate() {
        a_host[i * stride_a..i * stride_a + c.a.len()].copy_from_slice(&c.a);
        b_host[i * stride_b..i * stride_b + c.b.len()].copy_from_slice(&c.b);
    }
    let a = upload(&handle, &a_host);
    let b = upload(&handle, &b_host);
    unsafe {
        trsm_strided_batched(
            Some(&handle),
            Side::Left,
            Fill::Upper,
            Operation::Transpose,
            Diagonal::NonUnit,
            33i64,
            6,
            ScalarPtr::host(&1.25),
            a.as_ptr(),
            lda as i64,
            stride_a as i64,
            b.as_ptr(),
            ldb as i64,
            stride_b as i64,
            batch as i64,
        )
        .unwrap()
    };
    let out = b.to_host();
    for (i, c) in cases.iter().enumerate() {
        c.check(&out[i * stride_b..i * stride_b + c.b.len()]);
    }
}

#[test]
fn test_trsm_pointer_array_batched() {
    let handle = create_handle();
    let cases: Vec<_> = (0..3)
        .map(|i| TrsmCase::<f32>::new(60 + i, Side::Right, Fill::Lower, Operation::None, Diagonal::Unit, 8, 140, -1.0))
        .collect();
    let a_bufs: Vec<_> = cases.iter().map(|c| upload(&handle, &c.a)).collect();
    let b_bufs: Vec<_> = cases.iter().map(|c| upload(&handle, &c.b)).collect();
    let a_arr = upload(&handle, &a_bufs.iter().map(DeviceBuffer::as_ptr).collect::<Vec<_>>());
    let b_arr = upload(&handle, &b_bufs.iter().map(DeviceBuffer::as_ptr).collect::<Vec<_>>());
    unsafe {
        trsm_batched(
            Some(&handle),
            Side::Right,
            Fill::Lower,
            Operation::None,
            Diagonal::Unit,
            8i64,
            140,
            ScalarPtr::host(&-1.0f32),
            a_arr.as_ptr(),
            cases[0].lda as i64,
            b_arr.as_ptr(),
            cases[0].ldb as i64,
            3,
        )
        .unwrap()
    };
    for (c, b) in cases.iter().zip(&b_bufs) {
        c.check(&b.to_host());
    }
}

#[test]
fn test_trsm_pointer_array_null_member() {
    let handle = create_handle();
    let a = upload(&handle, &[1.0f64; 4]);
    let b = upload(&handle, &[1.0f64; 4]);
    let a_arr = upload(&handle, &[a.as_ptr(), a.as_ptr()]);
    let b_arr = upload(&handle, &[b.as_ptr(), DevicePtr::null()]);
    let r = unsafe {
        trsm_batched(
            Some(&handle),
            Side::Left,
            Fill::Lower,
            Operation::None,
            Diagonal::NonUnit,
            2i64,
            2,
            ScalarPtr::host(&1.0),
            a_arr.as_ptr(),
            2,
            b_arr.as_ptr(),
            2,
            2,
        )
    };
    assert_eq!(r, Err(Error::invalid_pointer("B")));
}

#[test]
fn test_trsm_ex_with_precomputed_blocks() {
    let handle = create_handle();
    let case = TrsmCase::<f64>::new(7, Side::Left, Fill::Lower, Operation::ConjugateTranspose, Diagonal::NonUnit, 200, 5, 2.0);
    let a = upload(&handle, &case.a);
    let b = upload(&handle, &case.b);

    // invert each 128 block with trtri, block j at j * BS * BS, ld BS
    let k = case.m;
    let inv = DeviceBuffer::<f64>::new(handle.client(), inv_a_elems(k)).unwrap();
    let blocks = k.div_ceil(TRSM_BLOCK);
    let full = k / TRSM_BLOCK;
    unsafe {
        trtri_strided_batched(
            Some(&handle),
            case.uplo,
            case.diag,
            TRSM_BLOCK as i64,
            a.as_ptr(),
            case.lda as i64,
            (TRSM_BLOCK * (case.lda + 1)) as i64,
            inv.as_ptr(),
            TRSM_BLOCK as i64,
            (TRSM_BLOCK * TRSM_BLOCK) as i64,
            full as i64,
        )
        .unwrap()
    };
    let rem = k - full * TRSM_BLOCK;
    assert_eq!(blocks, full + 1);
    unsafe {
        numr_blas::ops::trtri(
            Some(&handle),
            case.uplo,
            case.diag,
            rem as i64,
            a.as_ptr().offset((full * TRSM_BLOCK * (case.lda + 1)) as isize),
            case.lda as i64,
            inv.as_ptr().offset((full * TRSM_BLOCK * TRSM_BLOCK) as isize),
            TRSM_BLOCK as i64,
        )
        .unwrap()
    };

    unsafe {
        trsm_ex(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            case.m as i64,
            case.n as i64,
            ScalarPtr::host(&case.alpha),
            a.as_ptr(),
            case.lda as i64,
            b.as_ptr(),
            case.ldb as i64,
            inv.as_ptr(),
            inv.len() as i64,
            DType::F64,
        )
        .unwrap()
    };
    case.check(&b.to_host());
}

#[test]
fn test_trsm_ex_short_inverse_is_recomputed() {
    let handle = create_handle();
    let case = TrsmCase::<f64>::new(8, Side::Right, Fill::Upper, Operation::None, Diagonal::NonUnit, 4, 30, 1.0);
    let a = upload(&handle, &case.a);
    let b = upload(&handle, &case.b);
    // garbage blocks, but too short to be used
    let inv = upload(&handle, &vec![f64::NAN; 10]);
    unsafe {
        trsm_ex(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            case.m as i64,
            case.n as i64,
            ScalarPtr::host(&case.alpha),
            a.as_ptr(),
            case.lda as i64,
            b.as_ptr(),
            case.ldb as i64,
            inv.as_ptr(),
            10,
            DType::F64,
        )
        .unwrap()
    };
    case.check(&b.to_host());
}

#[test]
fn test_trsm_batched_ex_and_strided_ex() {
    let handle = create_handle();
    let case = TrsmCase::<f64>::new(10, Side::Left, Fill::Upper, Operation::None, Diagonal::Unit, 16, 4, 1.0);
    let a = upload(&handle, &case.a);
    let inv = DeviceBuffer::<f64>::new(handle.client(), inv_a_elems(16)).unwrap();
    unsafe {
        numr_blas::ops::trtri(
            Some(&handle),
            case.uplo,
            case.diag,
            16i64,
            a.as_ptr(),
            case.lda as i64,
            inv.as_ptr(),
            TRSM_BLOCK as i64,
        )
        .unwrap()
    };

    let b = upload(&handle, &case.b);
    unsafe {
        trsm_strided_batched_ex(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            16i64,
            4,
            ScalarPtr::host(&1.0),
            a.as_ptr(),
            case.lda as i64,
            0,
            b.as_ptr(),
            case.ldb as i64,
            0,
            1,
            inv.as_ptr(),
            inv.len() as i64,
            0,
            DType::F64,
        )
        .unwrap()
    };
    case.check(&b.to_host());

    let b = upload(&handle, &case.b);
    let a_arr = upload(&handle, &[a.as_ptr()]);
    let b_arr = upload(&handle, &[b.as_ptr()]);
    let inv_arr = upload(&handle, &[inv.as_ptr()]);
    unsafe {
        trsm_batched_ex(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            16i64,
            4,
            ScalarPtr::host(&1.0),
            a_arr.as_ptr(),
            case.lda as i64,
            b_arr.as_ptr(),
            case.ldb as i64,
            1,
            inv_arr.as_ptr(),
            inv.len() as i64,
            DType::F64,
        )
        .unwrap()
    };
    case.check(&b.to_host());
}

#[test]
fn test_trsm_ex_compute_type_must_match() {
    let handle = create_handle();
    let a = upload(&handle, &[2.0f32, 0.0, 0.0, 2.0]);
    let b = upload(&handle, &[4.0f32, 6.0]);
    let call = |compute_type| {
        unsafe {
            trsm_ex(
                Some(&handle),
                Side::Left,
                Fill::Lower,
                Operation::None,
                Diagonal::NonUnit,
                2i32,
                1,
                ScalarPtr::host(&1.0f32),
                a.as_ptr(),
                2,
                b.as_ptr(),
                2,
                DevicePtr::null(),
                0,
                compute_type,
            )
        }
    };
    for wrong in [DType::F64, DType::Complex64] {
        assert!(matches!(call(wrong), Err(Error::InvalidValue { arg: "compute_type", .. })));
    }
    assert_eq!(b.to_host(), vec![4.0, 6.0]);
    assert_eq!(call(DType::F32), Ok(()));
    assert_eq!(b.to_host(), vec![2.0, 3.0]);
}

#[test]
fn test_trsm_falls_back_to_panel_workspace() {
    // transposed left solve, m = 200, n = 10, f64:
    //   x_tmp 16000 B, invA 262144 B, backup 10240 B
    let case = TrsmCase::<f64>::new(11, Side::Left, Fill::Lower, Operation::Transpose, Diagonal::NonUnit, 200, 10, 1.0);
    let sizes = trsm_workspace_sizes::<f64>(Side::Left, Operation::Transpose, 200, 10, 1, 0);
    assert_eq!((sizes.x_tmp, sizes.inv_a, sizes.x_tmp_backup), (16000, 262144, 10240));

    let config = HandleConfig::new().device_memory_size(Some(275_000));
    let handle = Handle::with_config(CpuDevice::new(), config).unwrap();
    case.check(&run_single(&handle, &case));
}

#[test]
fn test_trsm_out_of_memory_before_compute() {
    let case = TrsmCase::<f64>::new(12, Side::Left, Fill::Lower, Operation::Transpose, Diagonal::NonUnit, 200, 10, 1.0);
    let config = HandleConfig::new().device_memory_size(Some(270_000));
    let handle = Handle::with_config(CpuDevice::new(), config).unwrap();
    let a = upload(&handle, &case.a);
    let b = upload(&handle, &case.b);
    let r = unsafe {
        trsm(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            200i64,
            10,
            ScalarPtr::host(&1.0),
            a.as_ptr(),
            case.lda as i64,
            b.as_ptr(),
            case.ldb as i64,
        )
    };
    assert!(matches!(r, Err(Error::OutOfMemory { .. })));
    assert_eq!(b.to_host(), case.b, "B untouched");
}

#[test]
fn test_trsm_device_limit_falls_back() {
    // the device itself cannot hold the out-of-place scratch
    let case = TrsmCase::<f64>::new(13, Side::Right, Fill::Upper, Operation::Transpose, Diagonal::NonUnit, 10, 200, 1.0);
    let operands = (case.a.len() + case.b.len()) * 8;
    let device = CpuDevice::new().with_memory_limit(operands + 275_000);
    let handle = Handle::new(device);
    case.check(&run_single(&handle, &case));
}

#[test]
fn test_trsm_with_caller_workspace() {
    let handle = create_handle();
    for optimal_mem in [false, true] {
        let case = TrsmCase::<f64>::new(14, Side::Left, Fill::Upper, Operation::Transpose, Diagonal::NonUnit, 140, 3, 1.0);
        let sizes = trsm_workspace_sizes::<f64>(case.side, case.trans, case.m, case.n, 1, 0);
        let x_bytes = if optimal_mem { sizes.x_tmp_backup } else { sizes.x_tmp };
        let x_tmp = DeviceBuffer::<f64>::new(handle.client(), x_bytes / 8).unwrap();
        let inv_a = DeviceBuffer::<f64>::new(handle.client(), sizes.inv_a / 8).unwrap();
        let a = upload(&handle, &case.a);
        let b = upload(&handle, &case.b);
        let ws = TrsmWorkspace {
            x_tmp: x_tmp.as_ptr(),
            inv_a: inv_a.as_ptr(),
            ..Default::default()
        };
        unsafe {
            trsm_with_workspace(
                Some(&handle),
                case.side,
                case.uplo,
                case.trans,
                case.diag,
                case.m as i64,
                case.n as i64,
                ScalarPtr::host(&case.alpha),
                &Single(a.as_ptr()),
                case.lda as i64,
                &Single(b.as_ptr()),
                case.ldb as i64,
                1,
                &ws,
                optimal_mem,
            )
            .unwrap()
        };
        case.check(&b.to_host());
    }
}

#[test]
fn test_trsm_check_numerics() {
    let config = HandleConfig::new().check_numerics(true);
    let handle = Handle::with_config(CpuDevice::new(), config).unwrap();
    let mut case = TrsmCase::<f64>::new(15, Side::Left, Fill::Lower, Operation::None, Diagonal::NonUnit, 4, 2, 1.0);
    // a NaN in the unreferenced triangle is fine
    case.a[case.lda * 3] = f64::NAN;
    case.check(&run_single(&handle, &case));

    case.b[1] = f64::INFINITY;
    let a = upload(&handle, &case.a);
    let b = upload(&handle, &case.b);
    let r = unsafe {
        trsm(
            Some(&handle),
            case.side,
            case.uplo,
            case.trans,
            case.diag,
            4i64,
            2,
            ScalarPtr::host(&1.0),
            a.as_ptr(),
            case.lda as i64,
            b.as_ptr(),
            case.ldb as i64,
        )
    };
    assert_eq!(r, Err(Error::NumericsCheckFailed { arg: "B" }));
}

#[test]
fn test_trsm_singular_pivot_stays_finite() {
    let handle = create_handle();
    // lower 2x2 with a zero pivot
    let a = upload(&handle, &[0.0f64, 1.0, 0.0, 2.0]);
    let b = upload(&handle, &[1.0f64, 1.0]);
    unsafe {
        trsm(
            Some(&handle),
            Side::Left,
            Fill::Lower,
            Operation::None,
            Diagonal::NonUnit,
            2i64,
            1,
            ScalarPtr::host(&1.0),
            a.as_ptr(),
            2,
            b.as_ptr(),
            2,
        )
        .unwrap()
    };
    assert!(b.to_host().iter().all(|v| v.is_finite()));
}
