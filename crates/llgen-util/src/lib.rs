// repetition bounds for grammar operators: `[ .. ]` is (0, Infinite), `< .. >` is (0, 1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeUInt {
    Finite(u32),
    Infinite,
}

/// Declares a `u32` newtype used to address one arena (`Vec`) of a grammar.
#[macro_export]
macro_rules! make_type_idx {
    ($type_idx_name:tt, $type_name:tt) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $type_idx_name(u32);

        impl $type_idx_name {
            pub fn from_push(vec: &mut Vec<$type_name>, val: $type_name) -> $type_idx_name {
                let idx = $type_idx_name(vec.len() as u32);
                vec.push(val);
                idx
            }

            pub fn from_usize(index: usize) -> $type_idx_name {
                $type_idx_name(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::ops::Index<$type_idx_name> for [$type_name] {
            type Output = $type_name;

            fn index(&self, index: $type_idx_name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl std::ops::IndexMut<$type_idx_name> for [$type_name] {
            fn index_mut(&mut self, index: $type_idx_name) -> &mut Self::Output {
                &mut self[index.0 as usize]
            }
        }

        impl std::ops::Index<$type_idx_name> for Vec<$type_name> {
            type Output = $type_name;

            fn index(&self, index: $type_idx_name) -> &Self::Output {
                &self.as_slice()[index]
            }
        }

        impl std::ops::IndexMut<$type_idx_name> for Vec<$type_name> {
            fn index_mut(&mut self, index: $type_idx_name) -> &mut Self::Output {
                &mut self.as_mut_slice()[index]
            }
        }
    };
}
