//! Wire messages exchanged with the input and presentation collaborators.

pub mod capture {
    /// Direction intent from the input feed.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct CaptureInput {
        #[prost(enumeration = "Heading", tag = "1")]
        pub direction: i32,
    }

    #[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
    pub struct Point {
        #[prost(int32, tag = "1")]
        pub x: i32,
        #[prost(int32, tag = "2")]
        pub y: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Ring {
        #[prost(message, repeated, tag = "1")]
        pub points: ::prost::alloc::vec::Vec<Point>,
    }

    /// One claimed polygon: outer ring first, then holes.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Region {
        #[prost(message, repeated, tag = "1")]
        pub rings: ::prost::alloc::vec::Vec<Ring>,
    }

    /// Everything presentation needs after a tick.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CaptureState {
        #[prost(uint32, tag = "1")]
        pub tick: u32,
        #[prost(message, optional, tag = "2")]
        pub position: ::core::option::Option<Point>,
        #[prost(enumeration = "Heading", tag = "3")]
        pub direction: i32,
        #[prost(enumeration = "Heading", tag = "4")]
        pub queued: i32,
        #[prost(message, repeated, tag = "5")]
        pub trail: ::prost::alloc::vec::Vec<Point>,
        #[prost(message, repeated, tag = "6")]
        pub regions: ::prost::alloc::vec::Vec<Region>,
        #[prost(bool, tag = "7")]
        pub outside: bool,
        #[prost(bool, tag = "8")]
        pub game_over: bool,
        /// Claimed percentage in `[0, 100]`
        #[prost(double, tag = "9")]
        pub score: f64,
        #[prost(enumeration = "EndReason", tag = "10")]
        pub reason: i32,
        #[prost(uint32, tag = "11")]
        pub grid_width: u32,
        #[prost(uint32, tag = "12")]
        pub grid_height: u32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Heading {
        None = 0,
        Up = 1,
        Down = 2,
        Left = 3,
        Right = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum EndReason {
        Running = 0,
        Wall = 1,
        OwnTrail = 2,
    }
}
