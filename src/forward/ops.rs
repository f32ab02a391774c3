// src/forward/ops.rs

//! Forwarding operations on [`ForwardingHandle`].
//!
//! Each operation first resolves the handle (blocking unless the value is
//! cached) and then applies the operation to the value. Results come back
//! as plain values wrapped in [`Result`], never as another handle.
//!
//! The arithmetic operators are implemented for `&ForwardingHandle<T>` with
//! `Output = Result<_>`, so call sites read `(&a + &b)?`.
//!
//! Each operator has two impls (handle with handle, handle with value), so
//! the compiler needs `T` pinned before it can pick one. When `T` is only
//! known from an untyped literal in the job closure, annotate the binding:
//! `let a: ForwardingHandle<i32> = exec.submit(|| Ok(1))?;`.

use std::cmp::Ordering;
use std::fmt::Display;
use std::ops::{Add, Div, Index, Mul, Neg, Rem, Sub};

use crate::errors::Result;
use crate::forward::handle::ForwardingHandle;

impl<T> ForwardingHandle<T> {
    /// Resolve, then apply `f` to the value.
    pub fn map<U, F>(&self, f: F) -> Result<U>
    where
        F: FnOnce(&T) -> U,
    {
        self.get().map(f)
    }

    /// Resolve both handles, then combine their values.
    ///
    /// The result does not depend on which handle finished first.
    pub fn zip_with<U, R, F>(&self, other: &ForwardingHandle<U>, f: F) -> Result<R>
    where
        F: FnOnce(&T, &U) -> R,
    {
        let lhs = self.get()?;
        let rhs = other.get()?;
        Ok(f(lhs, rhs))
    }

    pub fn try_eq(&self, other: &ForwardingHandle<T>) -> Result<bool>
    where
        T: PartialEq,
    {
        self.zip_with(other, |a, b| a == b)
    }

    pub fn eq_value(&self, value: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        self.map(|v| v == value)
    }

    pub fn try_cmp(&self, other: &ForwardingHandle<T>) -> Result<Option<Ordering>>
    where
        T: PartialOrd,
    {
        self.zip_with(other, |a, b| a.partial_cmp(b))
    }

    pub fn try_index<I>(&self, index: I) -> Result<<T as Index<I>>::Output>
    where
        T: Index<I>,
        <T as Index<I>>::Output: Clone + Sized,
    {
        self.map(|v| v[index].clone())
    }

    /// Resolve to a callable and invoke it with `arg`.
    pub fn call<A, R>(&self, arg: A) -> Result<R>
    where
        T: Fn(A) -> R,
    {
        self.map(|f| f(arg))
    }

    /// Resolve to a zero-argument callable and invoke it.
    pub fn invoke<R>(&self) -> Result<R>
    where
        T: Fn() -> R,
    {
        self.map(|f| f())
    }

    pub fn try_to_string(&self) -> Result<String>
    where
        T: Display,
    {
        self.map(|v| v.to_string())
    }

    /// Resolve, then iterate the value by reference.
    pub fn try_iter<'a>(&'a self) -> Result<<&'a T as IntoIterator>::IntoIter>
    where
        &'a T: IntoIterator,
    {
        self.get().map(IntoIterator::into_iter)
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl<'a, T, O> $trait<&'a ForwardingHandle<T>> for &'a ForwardingHandle<T>
        where
            T: $trait<Output = O> + Clone,
        {
            type Output = Result<O>;

            fn $method(self, rhs: &'a ForwardingHandle<T>) -> Result<O> {
                self.zip_with(rhs, |a, b| a.clone().$method(b.clone()))
            }
        }

        impl<'a, T, O> $trait<T> for &'a ForwardingHandle<T>
        where
            T: $trait<Output = O> + Clone,
        {
            type Output = Result<O>;

            fn $method(self, rhs: T) -> Result<O> {
                self.map(|a| a.clone().$method(rhs))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Div, div);
forward_binop!(Rem, rem);

impl<'a, T, O> Neg for &'a ForwardingHandle<T>
where
    T: Neg<Output = O> + Clone,
{
    type Output = Result<O>;

    fn neg(self) -> Result<O> {
        self.map(|a| a.clone().neg())
    }
}
