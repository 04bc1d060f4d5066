//! Locality classification and write tracking.

use crate::il;
use rustc_hash::FxHashSet;

/// The per-function local-address and written-address sets.
///
/// The local set is seeded from every address referenced by a debug
/// binding, then pruned in one pass over the function body: an address
/// passed as a call argument escapes, and an address whose value is itself
/// the source of a write escapes (the pointer is persisted elsewhere).
/// Membership is revoked, never re-added.
///
/// The written set holds every address that is the destination of a write
/// carrying a source location. Writes without a location are
/// compiler-inserted initializers and do not count as real mutations; the
/// precision of that split is inherited from upstream debug-info
/// generation.
#[derive(Clone, Debug, Default)]
pub struct Locality {
    local: FxHashSet<il::ValueId>,
    written: FxHashSet<il::ValueId>,
}

impl Locality {
    /// Classify the addresses of a function.
    pub fn classify(function: &il::Function) -> Locality {
        let mut local: FxHashSet<il::ValueId> = FxHashSet::default();

        for (_, instruction) in function.instructions() {
            if let il::Operation::Bind { address } = *instruction.operation() {
                local.insert(address);
            }
        }

        let mut written: FxHashSet<il::ValueId> = FxHashSet::default();

        for (_, instruction) in function.instructions() {
            match *instruction.operation() {
                il::Operation::Call { ref arguments, .. } => {
                    for argument in arguments {
                        if let Some(value) = argument.value() {
                            local.remove(&value);
                        }
                    }
                }
                il::Operation::Write { address, ref src } => {
                    if instruction.location().is_some() {
                        written.insert(address);
                    }
                    if let Some(value) = src.value() {
                        local.remove(&value);
                    }
                }
                _ => {}
            }
        }

        Locality { local, written }
    }

    /// True when the address never escapes the function.
    pub fn is_local(&self, address: il::ValueId) -> bool {
        self.local.contains(&address)
    }

    /// True when the address is the destination of a located write.
    pub fn is_written(&self, address: il::ValueId) -> bool {
        self.written.contains(&address)
    }

    pub fn locals(&self) -> &FxHashSet<il::ValueId> {
        &self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il;

    fn function_with_block<F>(build: F) -> il::Function
    where
        F: FnOnce(&mut il::Function, usize),
    {
        let mut function = il::Function::new("test");
        let block_index = function.control_flow_graph_mut().new_block().unwrap();
        build(&mut function, block_index);
        function
    }

    #[test]
    fn bound_address_is_local() {
        let function = function_with_block(|function, block_index| {
            let a = function.new_value("a");
            function.block_mut(block_index).unwrap().bind(a);
        });
        let a = function.values()[0].id();

        let locality = Locality::classify(&function);
        assert!(locality.is_local(a));
        assert!(!locality.is_written(a));
    }

    #[test]
    fn call_argument_escapes() {
        let function = function_with_block(|function, block_index| {
            let a = function.new_value("a");
            let block = function.block_mut(block_index).unwrap();
            block.bind(a);
            block.call("helper", vec![il::Operand::Value(a)]);
        });
        let a = function.values()[0].id();

        let locality = Locality::classify(&function);
        assert!(!locality.is_local(a));
    }

    #[test]
    fn stored_pointer_escapes() {
        let function = function_with_block(|function, block_index| {
            let a = function.new_value("a");
            let p = function.new_value("p");
            let block = function.block_mut(block_index).unwrap();
            block.bind(a);
            block.bind(p);
            // the address of a is itself persisted through p
            block.write(p, il::Operand::Value(a));
        });
        let a = function.values()[0].id();
        let p = function.values()[1].id();

        let locality = Locality::classify(&function);
        assert!(!locality.is_local(a));
        assert!(locality.is_local(p));
    }

    #[test]
    fn located_write_is_tracked_unlocated_is_not() {
        let function = function_with_block(|function, block_index| {
            let a = function.new_value("a");
            let b = function.new_value("b");
            let block = function.block_mut(block_index).unwrap();
            block.bind(a);
            block.bind(b);
            block
                .write(a, il::Operand::Integer(1))
                .set_location(Some(il::SourceLocation::new(3, 1)));
            // compiler-inserted initializer, no source location
            block.write(b, il::Operand::Integer(0));
        });
        let a = function.values()[0].id();
        let b = function.values()[1].id();

        let locality = Locality::classify(&function);
        assert!(locality.is_written(a));
        assert!(!locality.is_written(b));
    }
}
