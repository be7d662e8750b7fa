//! Operand stack for charstring evaluation.

use types::Fixed;

use super::Error;

/// Maximum size of the operand stack.
///
/// "The Type 2 argument stack ... may contain up to 48 operands."
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const MAX_STACK: usize = 48;

/// Fixed capacity operand stack.
///
/// Integer operands are stored as 16.16 values; every charstring integer
/// form fits in the 16-bit integer part.
pub struct Stack {
    values: [Fixed; MAX_STACK],
    top: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            values: [Fixed::ZERO; MAX_STACK],
            top: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn len(&self) -> usize {
        self.top
    }

    pub fn verify_at_least_len(&self, len: usize) -> Result<(), Error> {
        if self.top < len {
            Err(Error::StackUnderflow)
        } else {
            Ok(())
        }
    }

    /// Returns true if the number of elements on the stack is odd.
    ///
    /// Used for processing some charstring operators where an odd
    /// count represents the presence of the glyph advance width at the
    /// bottom of the stack.
    pub fn len_is_odd(&self) -> bool {
        self.top & 1 != 0
    }

    pub fn clear(&mut self) {
        self.top = 0;
    }

    pub fn push(&mut self, value: Fixed) -> Result<(), Error> {
        let slot = self.values.get_mut(self.top).ok_or(Error::StackOverflow)?;
        *slot = value;
        self.top += 1;
        Ok(())
    }

    pub fn push_i32(&mut self, value: i32) -> Result<(), Error> {
        self.push(Fixed::from_i32(value))
    }

    /// Returns the value at the given index, counting from the bottom of the
    /// stack.
    pub fn get(&self, index: usize) -> Result<Fixed, Error> {
        self.values[..self.top]
            .get(index)
            .copied()
            .ok_or(Error::StackUnderflow)
    }

    /// Returns an array of `N` values starting at `first_index`.
    pub fn get_array<const N: usize>(&self, first_index: usize) -> Result<[Fixed; N], Error> {
        let end = first_index.checked_add(N).ok_or(Error::StackUnderflow)?;
        let values = self
            .values
            .get(first_index..end)
            .filter(|_| end <= self.top)
            .ok_or(Error::StackUnderflow)?;
        let mut result = [Fixed::ZERO; N];
        result.copy_from_slice(values);
        Ok(result)
    }

    pub fn pop(&mut self) -> Result<Fixed, Error> {
        self.top = self.top.checked_sub(1).ok_or(Error::StackUnderflow)?;
        Ok(self.values[self.top])
    }

    /// Pops the top value, truncating any fractional part.
    pub fn pop_i32(&mut self) -> Result<i32, Error> {
        Ok(self.pop()?.to_bits() >> 16)
    }

    /// All values currently on the stack, bottom first.
    pub fn values(&self) -> &[Fixed] {
        &self.values[..self.top]
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop() {
        let mut stack = Stack::new();
        stack.push_i32(-20).unwrap();
        stack.push(Fixed::from_f64(2.5)).unwrap();
        assert_eq!(stack.len(), 2);
        assert!(!stack.len_is_odd());
        assert_eq!(stack.pop_i32().unwrap(), 2);
        assert_eq!(stack.pop().unwrap(), Fixed::from_i32(-20));
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), Err(Error::StackUnderflow));
    }

    #[test]
    fn overflow() {
        let mut stack = Stack::new();
        for i in 0..MAX_STACK {
            stack.push_i32(i as i32).unwrap();
        }
        assert_eq!(stack.push_i32(0), Err(Error::StackOverflow));
        assert_eq!(stack.len(), MAX_STACK);
    }

    #[test]
    fn arrays() {
        let mut stack = Stack::new();
        for i in 1..=5 {
            stack.push_i32(i).unwrap();
        }
        let [a, b, c] = stack.get_array::<3>(2).unwrap();
        assert_eq!([a, b, c], [3, 4, 5].map(Fixed::from_i32));
        assert_eq!(stack.get_array::<3>(3), Err(Error::StackUnderflow));
        stack.clear();
        // stale values above the top are not visible
        assert_eq!(stack.get(0), Err(Error::StackUnderflow));
        assert_eq!(stack.get_array::<1>(0), Err(Error::StackUnderflow));
    }

    #[test]
    fn negative_fraction_truncates_down() {
        let mut stack = Stack::new();
        stack.push(Fixed::from_f64(-1.5)).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), -2);
    }
}
