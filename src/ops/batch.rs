//! Batch accessors: one interface over the three ways of addressing the
//! members of a batched call
//!
//! - [`Single`]: the non-batched routines (one member)
//! - [`Strided`]: one base pointer plus a fixed element stride
//! - [`PointerArray`]: a device array holding one pointer per member
//!
//! The engine only ever asks for "the base address of member i", so every
//! routine is written once over [`BatchAccessor`].

use crate::runtime::DevicePtr;

/// Yields the base address of each batch member
pub trait BatchAccessor<T>: Send + Sync {
    /// Whether members are addressed through a device array of pointers
    const POINTER_ARRAY: bool;

    /// True when the accessor itself is null (base or array pointer)
    fn is_null(&self) -> bool;

    /// Base address of member `index`
    ///
    /// Must not be called on a null accessor.
    fn member(&self, index: usize) -> DevicePtr<T>;

    /// Index of the first null member among `0..count`, if any
    fn first_null_member(&self, count: usize) -> Option<usize> {
        (0..count).find(|&i| self.member(i).is_null())
    }
}

/// A single, non-batched operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Single<T>(pub DevicePtr<T>);

impl<T> BatchAccessor<T> for Single<T> {
    const POINTER_ARRAY: bool = false;

    fn is_null(&self) -> bool {
        self.0.is_null()
    }

    fn member(&self, _index: usize) -> DevicePtr<T> {
        self.0
    }
}

/// Members at `base + i * stride` elements
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Strided<T> {
    base: DevicePtr<T>,
    stride: i64,
}

impl<T> Strided<T> {
    /// Members starting at `base`, `stride` elements apart
    pub fn new(base: DevicePtr<T>, stride: i64) -> Self {
        Self { base, stride }
    }

    /// Element stride between members
    pub fn stride(&self) -> i64 {
        self.stride
    }
}

impl<T> BatchAccessor<T> for Strided<T> {
    const POINTER_ARRAY: bool = false;

    fn is_null(&self) -> bool {
        self.base.is_null()
    }

    fn member(&self, index: usize) -> DevicePtr<T> {
        self.base.offset((index as i64 * self.stride) as isize)
    }
}

/// Members listed in a device array of pointers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointerArray<T> {
    array: DevicePtr<DevicePtr<T>>,
}

impl<T> PointerArray<T> {
    /// Members listed at `array[0..batch_count]`
    ///
    /// # Safety
    ///
    /// A non-null `array` must stay valid for reads of every index later
    /// passed to [`BatchAccessor::member`] for the life of the accessor.
    pub unsafe fn new(array: DevicePtr<DevicePtr<T>>) -> Self {
        Self { array }
    }

    /// The device array itself
    pub fn array(&self) -> DevicePtr<DevicePtr<T>> {
        self.array
    }
}

impl<T> BatchAccessor<T> for PointerArray<T> {
    const POINTER_ARRAY: bool = true;

    fn is_null(&self) -> bool {
        self.array.is_null()
    }

    fn member(&self, index: usize) -> DevicePtr<T> {
        debug_assert!(!self.array.is_null());
        // SAFETY: `PointerArray::new` requires the array to be readable at
        // every index the routines ask for.
        unsafe { std::ptr::read((self.array.addr() as *const DevicePtr<T>).add(index)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::DeviceBuffer;
    use crate::runtime::cpu::{CpuClient, CpuDevice};

    #[test]
    fn test_strided_members() {
        let client = CpuClient::new(CpuDevice::new());
        let buf = DeviceBuffer::<f64>::new(&client, 30).unwrap();
        let s = Strided::new(buf.as_ptr(), 10);
        assert_eq!(s.member(2), buf.as_ptr().offset(20));
        assert!(!s.is_null());
        assert_eq!(s.first_null_member(3), None);
    }

    #[test]
    fn test_pointer_array_members() {
        let client = CpuClient::new(CpuDevice::new());
        let a = DeviceBuffer::<f32>::new(&client, 4).unwrap();
        let arr = DeviceBuffer::from_host(&client, &[a.as_ptr(), DevicePtr::null()]).unwrap();
        let p = unsafe { PointerArray::new(arr.as_ptr()) };
        assert_eq!(p.member(0), a.as_ptr());
        assert_eq!(p.first_null_member(2), Some(1));
    }

    #[test]
    fn test_single_is_null() {
        assert!(Single::<f64>(DevicePtr::null()).is_null());
    }
}
