use entryscope_host::{HostEnv, MethodHandle, Scoped};

use super::error_reporter::ErrorReporter;

/// Declaring-class signature and name of a method; fields are empty when
/// the host could not resolve them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub class_signature: String,
    pub method_name: String,
}

pub struct SymbolResolver<'a> {
    env: &'a dyn HostEnv,
    reporter: &'a ErrorReporter<'a>,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(env: &'a dyn HostEnv, reporter: &'a ErrorReporter<'a>) -> Self {
        Self { env, reporter }
    }

    /// declaring class, then class signature, then method name
    pub fn resolve(&self, method: MethodHandle) -> ResolvedSymbol {
        let class_signature = self
            .reporter
            .check(
                self.env.method_declaring_class(method),
                "Cannot load declaring class",
            )
            .and_then(|class| {
                self.reporter
                    .check(self.env.class_signature(class), "Cannot load class signature")
            })
            .map(Scoped::into_value)
            .unwrap_or_default();

        let method_name = self
            .reporter
            .check(self.env.method_name(method), "Cannot load method name")
            .map(Scoped::into_value)
            .unwrap_or_default();

        ResolvedSymbol {
            class_signature,
            method_name,
        }
    }
}
