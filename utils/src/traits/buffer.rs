pub trait GenericFragmentComposer {
    type In;
    type Out;
    type Error;
    fn enqueue(&mut self, packet: Self::In) -> Result<Option<Self::Out>, Self::Error>;
}
