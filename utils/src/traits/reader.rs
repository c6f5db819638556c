pub trait BitwiseReadFrom<R>: Sized {
    type Error;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error>;
}

/// For syntax structures whose layout depends on previously parsed state,
/// e.g. SEI payloads sized by the active HRD parameters.
pub trait BitwiseReadWithContext<Ctx, R>: Sized {
    type Error;
    fn read_with_context(context: Ctx, reader: &mut R) -> Result<Self, Self::Error>;
}
