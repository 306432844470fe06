//! Protobuf messages and gRPC clients for `logcentral.v1`
//!
//! Written by hand to match `proto/logcentral/v1/logcentral.proto`, so the
//! build does not need protoc.

pub mod logcentral {
    pub mod v1 {
        use prost::Message;

        #[derive(Clone, PartialEq, Message)]
        pub struct Ack {}

        #[derive(Clone, PartialEq, Message)]
        pub struct NameRequest {
            #[prost(string, tag = "1")]
            pub name: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct NameList {
            #[prost(string, repeated, tag = "1")]
            pub names: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct StatusReply {
            #[prost(int32, tag = "1")]
            pub status: i32,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct RegisterComponentRequest {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub hostname: String,
            #[prost(string, tag = "3")]
            pub reason: String,
            #[prost(message, optional, tag = "4")]
            pub timestamp: Option<prost_types::Timestamp>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct RegisterComponentResponse {
            #[prost(int32, tag = "1")]
            pub status: i32,
            #[prost(string, tag = "2")]
            pub assigned_name: String,
            #[prost(string, repeated, tag = "3")]
            pub tag_filter: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UnregisterComponentRequest {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub reason: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct SynchronizeRequest {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(message, optional, tag = "2")]
            pub timestamp: Option<prost_types::Timestamp>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct LogRecord {
            #[prost(string, tag = "1")]
            pub producer_name: String,
            #[prost(message, optional, tag = "2")]
            pub timestamp: Option<prost_types::Timestamp>,
            #[prost(bool, tag = "3")]
            pub is_binary: bool,
            #[prost(string, tag = "4")]
            pub tag: String,
            #[prost(string, tag = "5")]
            pub text: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct MessageBatch {
            #[prost(message, repeated, tag = "1")]
            pub records: Vec<LogRecord>,
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
        #[repr(i32)]
        pub enum FilterAction {
            Set = 0,
            Add = 1,
            Remove = 2,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct TagFilterUpdate {
            #[prost(enumeration = "FilterAction", tag = "1")]
            pub action: i32,
            #[prost(string, repeated, tag = "2")]
            pub tags: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ConnectToolResponse {
            #[prost(int32, tag = "1")]
            pub status: i32,
            #[prost(string, tag = "2")]
            pub assigned_name: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct FilterSpec {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, repeated, tag = "2")]
            pub tags: Vec<String>,
            #[prost(string, repeated, tag = "3")]
            pub components: Vec<String>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct AddFilterRequest {
            #[prost(string, tag = "1")]
            pub tool_name: String,
            #[prost(message, optional, tag = "2")]
            pub filter: Option<FilterSpec>,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct RemoveFilterRequest {
            #[prost(string, tag = "1")]
            pub tool_name: String,
            #[prost(string, tag = "2")]
            pub filter_name: String,
        }

        pub mod log_central_component_client {
            use super::*;
            use tonic::codegen::*;
            use tonic::transport::Uri;

            #[derive(Debug, Clone)]
            pub struct LogCentralComponentClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl LogCentralComponentClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> LogCentralComponentClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub fn with_origin(inner: T, origin: Uri) -> Self {
                    let inner = tonic::client::Grpc::with_origin(inner, origin);
                    Self { inner }
                }

                pub async fn register_component(
                    &mut self,
                    request: impl tonic::IntoRequest<RegisterComponentRequest>,
                ) -> Result<tonic::Response<RegisterComponentResponse>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralComponent/RegisterComponent",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn unregister_component(
                    &mut self,
                    request: impl tonic::IntoRequest<UnregisterComponentRequest>,
                ) -> Result<tonic::Response<StatusReply>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralComponent/UnregisterComponent",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn ping(
                    &mut self,
                    request: impl tonic::IntoRequest<NameRequest>,
                ) -> Result<tonic::Response<Ack>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralComponent/Ping",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn synchronize(
                    &mut self,
                    request: impl tonic::IntoRequest<SynchronizeRequest>,
                ) -> Result<tonic::Response<Ack>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralComponent/Synchronize",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn publish_batch(
                    &mut self,
                    request: impl tonic::IntoRequest<MessageBatch>,
                ) -> Result<tonic::Response<Ack>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralComponent/PublishBatch",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn watch_config(
                    &mut self,
                    request: impl tonic::IntoRequest<NameRequest>,
                ) -> Result<tonic::Response<tonic::codec::Streaming<TagFilterUpdate>>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralComponent/WatchConfig",
                    );
                    self.inner
                        .server_streaming(request.into_request(), path, codec)
                        .await
                }
            }
        }

        pub mod log_central_tool_client {
            use super::*;
            use tonic::codegen::*;
            use tonic::transport::Uri;

            #[derive(Debug, Clone)]
            pub struct LogCentralToolClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl LogCentralToolClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> LogCentralToolClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub fn with_origin(inner: T, origin: Uri) -> Self {
                    let inner = tonic::client::Grpc::with_origin(inner, origin);
                    Self { inner }
                }

                pub async fn connect_tool(
                    &mut self,
                    request: impl tonic::IntoRequest<NameRequest>,
                ) -> Result<tonic::Response<ConnectToolResponse>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/ConnectTool",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn disconnect_tool(
                    &mut self,
                    request: impl tonic::IntoRequest<NameRequest>,
                ) -> Result<tonic::Response<StatusReply>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/DisconnectTool",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn add_filter(
                    &mut self,
                    request: impl tonic::IntoRequest<AddFilterRequest>,
                ) -> Result<tonic::Response<StatusReply>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/AddFilter",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn remove_filter(
                    &mut self,
                    request: impl tonic::IntoRequest<RemoveFilterRequest>,
                ) -> Result<tonic::Response<StatusReply>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/RemoveFilter",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn flush_all_filters(
                    &mut self,
                    request: impl tonic::IntoRequest<NameRequest>,
                ) -> Result<tonic::Response<StatusReply>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/FlushAllFilters",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn get_defined_tags(
                    &mut self,
                    request: impl tonic::IntoRequest<Ack>,
                ) -> Result<tonic::Response<NameList>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/GetDefinedTags",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn get_defined_components(
                    &mut self,
                    request: impl tonic::IntoRequest<Ack>,
                ) -> Result<tonic::Response<NameList>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/GetDefinedComponents",
                    );
                    self.inner.unary(request.into_request(), path, codec).await
                }

                pub async fn subscribe(
                    &mut self,
                    request: impl tonic::IntoRequest<NameRequest>,
                ) -> Result<tonic::Response<tonic::codec::Streaming<MessageBatch>>, tonic::Status> {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/logcentral.v1.LogCentralTool/Subscribe",
                    );
                    self.inner
                        .server_streaming(request.into_request(), path, codec)
                        .await
                }
            }
        }
    }
}

pub use logcentral::v1::log_central_component_client::LogCentralComponentClient;
pub use logcentral::v1::log_central_tool_client::LogCentralToolClient;
pub use logcentral::v1::*;
