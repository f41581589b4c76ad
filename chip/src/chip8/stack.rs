use tinyvec::ArrayVec;

use crate::{definitions::cpu, error::StackError};

/// The return addresses of the active subroutine calls, at most
/// [`cpu::stack::SIZE`] deep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stack {
    entries: ArrayVec<[usize; cpu::stack::SIZE]>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will push the pointer onto the stack, fails if all nesting levels are used.
    pub fn push(&mut self, pointer: usize) -> Result<(), StackError> {
        self.entries
            .try_push(pointer)
            .map_or(Ok(()), |_| Err(StackError::Overflow))
    }

    pub fn pop(&mut self) -> Result<usize, StackError> {
        self.entries.pop().ok_or(StackError::Underflow)
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[usize] {
        self.entries.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_bounds() {
        let mut stack = Stack::new();
        assert!(stack.is_empty());

        let base = 0x0240;

        for i in 0..cpu::stack::SIZE {
            assert_eq!(Ok(()), stack.push(base + i * 8));
        }
        assert_eq!(Err(StackError::Overflow), stack.push(base));
        assert_eq!(cpu::stack::SIZE, stack.depth());

        for i in (0..cpu::stack::SIZE).rev() {
            assert_eq!(Ok(base + i * 8), stack.pop());
        }
        assert!(stack.is_empty());
        assert_eq!(Err(StackError::Underflow), stack.pop());
    }
}
