pub mod article;
pub mod article_tag;
pub mod chat_message;
pub mod chat_room;
pub mod chat_room_user;
pub mod comment;
pub mod culture_center;
pub mod lesson;
pub mod lesson_user;
pub mod love;
pub mod profile;
pub mod tag;
pub mod user;

pub use article::Article;
pub use article_tag::ArticleTag;
pub use chat_message::ChatMessage;
pub use chat_room::ChatRoom;
pub use chat_room_user::ChatRoomUser;
pub use comment::Comment;
pub use culture_center::CultureCenter;
pub use lesson::Lesson;
pub use lesson_user::LessonUser;
pub use love::Love;
pub use profile::Profile;
pub use tag::Tag;
pub use user::User;
