use super::key_pool::Credential;

/// 按密钥构造调用客户端
///
/// 调度层只依赖这个接口，不关心客户端内部如何调用外部 API。
pub trait ClientFactory: Send + Sync + 'static {
    type Client: Send + 'static;

    /// 构造绑定到指定密钥的客户端
    fn connect(&self, key: &Credential) -> Self::Client;

    /// 无需密钥的兜底客户端，未配置时返回 None
    fn fallback(&self) -> Option<Self::Client> {
        None
    }
}

impl<F: ClientFactory> ClientFactory for std::sync::Arc<F> {
    type Client = F::Client;

    fn connect(&self, key: &Credential) -> Self::Client {
        (**self).connect(key)
    }

    fn fallback(&self) -> Option<Self::Client> {
        (**self).fallback()
    }
}
