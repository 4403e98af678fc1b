use cipher::{Block, BlockSizeUser, ParBlocksSizeUser, StreamBackend, consts::U1};

use crate::core::Crypto1Core;

/// The software backend: one register clock per keystream bit.
pub struct Backend<'a>(pub(crate) &'a mut Crypto1Core);

impl BlockSizeUser for Backend<'_> {
    type BlockSize = U1;
}

impl ParBlocksSizeUser for Backend<'_> {
    type ParBlocksSize = U1;
}

impl StreamBackend for Backend<'_> {
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        // Keystream mode: nothing from the exchange is fed back, so the
        // input byte is zero and the encrypted flag stays off.
        block[0] = self.0.inner.byte(0, false);
    }
}
